//! MongoDB-backed gateways.
//!
//! Each unit of work is a client session running one multi-document
//! transaction, so the server must be a replica set (a single-node one is
//! enough). Identifiers are `i64` sequences kept in the `counters` collection.

use async_trait::async_trait;
use mongodb::{
    Client, ClientSession, Collection, Database, IndexModel, SessionCursor,
    bson::{Document, doc},
    options::{
        FindOneAndUpdateOptions, FindOptions, ReplaceOptions, ReturnDocument, UpdateOptions,
    },
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    error::StoreError,
    models::{Item, Order, User},
};

use super::{OrderRepository, Store, UnitOfWork, UserRepository};

const USERS: &str = "users";
const ORDERS: &str = "orders";
const COUNTERS: &str = "counters";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id")]
    id: i64,

    username: String,
    name: String,
    email: String,
    balance: i64,
}

impl UserDocument {
    fn from_user(id: i64, user: User) -> Self {
        Self {
            id,
            username: user.username,
            name: user.name,
            email: user.email,
            balance: user.balance,
        }
    }
}

impl From<UserDocument> for User {
    fn from(d: UserDocument) -> Self {
        User::new(Some(d.id), d.username, d.name, d.email, d.balance)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OrderDocument {
    #[serde(rename = "_id")]
    id: i64,

    item: Item,
    price: i64,

    #[serde(default)]
    user_id: Option<i64>,
}

impl OrderDocument {
    fn from_order(id: i64, order: Order) -> Self {
        Self {
            id,
            item: order.item,
            price: order.price,
            user_id: order.user_id,
        }
    }
}

impl From<OrderDocument> for Order {
    fn from(d: OrderDocument) -> Self {
        Order::new(Some(d.id), d.item, d.price, d.user_id)
    }
}

#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(db_name);
        Ok(Self { client, db })
    }

    /// Creates the collections up front (transactions cannot create them on
    /// older servers) plus the indexes the filter queries rely on.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let existing = self.db.list_collection_names(None).await?;
        for name in [USERS, ORDERS, COUNTERS] {
            if !existing.iter().any(|c| c == name) {
                self.db.create_collection(name, None).await?;
            }
        }

        // users: lookups by username and balance threshold
        {
            let col = self.db.collection::<Document>(USERS);
            for keys in [doc! { "username": 1 }, doc! { "balance": 1 }] {
                col.create_index(IndexModel::builder().keys(keys).build(), None)
                    .await?;
            }
        }

        // orders: cascade by owner, filter by item
        {
            let col = self.db.collection::<Document>(ORDERS);
            for keys in [doc! { "user_id": 1 }, doc! { "item": 1 }] {
                col.create_index(IndexModel::builder().keys(keys).build(), None)
                    .await?;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Store for MongoStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        Ok(Box::new(MongoUnitOfWork {
            session,
            users: self.db.collection(USERS),
            orders: self.db.collection(ORDERS),
            counters: self.db.collection(COUNTERS),
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}

pub struct MongoUnitOfWork {
    session: ClientSession,
    users: Collection<UserDocument>,
    orders: Collection<OrderDocument>,
    counters: Collection<Document>,
}

impl MongoUnitOfWork {
    async fn next_id(&mut self, counter: &str) -> Result<i64, StoreError> {
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .counters
            .find_one_and_update_with_session(
                doc! { "_id": counter },
                doc! { "$inc": { "seq": 1_i64 } },
                options,
                &mut self.session,
            )
            .await?;

        updated
            .and_then(|d| d.get_i64("seq").ok())
            .ok_or_else(|| StoreError::Other(format!("counter {counter} has no sequence")))
    }

    // keeps the sequence ahead of ids that were written explicitly
    async fn bump_counter(&mut self, counter: &str, id: i64) -> Result<(), StoreError> {
        self.counters
            .update_one_with_session(
                doc! { "_id": counter },
                doc! { "$max": { "seq": id } },
                UpdateOptions::builder().upsert(true).build(),
                &mut self.session,
            )
            .await?;
        Ok(())
    }

    async fn find_users(&mut self, filter: Document) -> Result<Vec<User>, StoreError> {
        let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let cursor = self
            .users
            .find_with_session(filter, options, &mut self.session)
            .await?;
        let docs = drain(cursor, &mut self.session).await?;
        Ok(docs.into_iter().map(User::from).collect())
    }

    async fn find_user(&mut self, filter: Document) -> Result<Option<User>, StoreError> {
        let found = self
            .users
            .find_one_with_session(filter, None, &mut self.session)
            .await?;
        Ok(found.map(User::from))
    }

    async fn find_orders(&mut self, filter: Document) -> Result<Vec<Order>, StoreError> {
        let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let cursor = self
            .orders
            .find_with_session(filter, options, &mut self.session)
            .await?;
        let docs = drain(cursor, &mut self.session).await?;
        Ok(docs.into_iter().map(Order::from).collect())
    }
}

async fn drain<T>(
    mut cursor: SessionCursor<T>,
    session: &mut ClientSession,
) -> Result<Vec<T>, StoreError>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let mut out = Vec::new();
    while let Some(next) = cursor.next(session).await {
        out.push(next?);
    }
    Ok(out)
}

#[async_trait]
impl UnitOfWork for MongoUnitOfWork {
    fn users(&mut self) -> &mut dyn UserRepository {
        self
    }

    fn orders(&mut self) -> &mut dyn OrderRepository {
        self
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MongoUnitOfWork { mut session, .. } = *self;
        session.commit_transaction().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        let MongoUnitOfWork { mut session, .. } = *self;
        session.abort_transaction().await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MongoUnitOfWork {
    async fn find_all(&mut self) -> Result<Vec<User>, StoreError> {
        self.find_users(doc! {}).await
    }

    async fn find_by_id(&mut self, id: i64) -> Result<Option<User>, StoreError> {
        self.find_user(doc! { "_id": id }).await
    }

    async fn save(&mut self, user: User) -> Result<User, StoreError> {
        let id = match user.id {
            Some(id) => id,
            None => self.next_id(USERS).await?,
        };
        let document = UserDocument::from_user(id, user);

        let result = self
            .users
            .replace_one_with_session(
                doc! { "_id": id },
                &document,
                ReplaceOptions::builder().upsert(true).build(),
                &mut self.session,
            )
            .await?;
        if result.upserted_id.is_some() {
            self.bump_counter(USERS, id).await?;
        }

        Ok(User::from(document))
    }

    async fn delete_by_id(&mut self, id: i64) -> Result<bool, StoreError> {
        let result = self
            .users
            .delete_one_with_session(doc! { "_id": id }, None, &mut self.session)
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn find_by_username(&mut self, username: &str) -> Result<Option<User>, StoreError> {
        self.find_user(doc! { "username": username }).await
    }

    async fn find_by_name(&mut self, name: &str) -> Result<Option<User>, StoreError> {
        self.find_user(doc! { "name": name }).await
    }

    async fn find_by_email(&mut self, email: &str) -> Result<Option<User>, StoreError> {
        self.find_user(doc! { "email": email }).await
    }

    async fn find_all_with_low_balance(&mut self, threshold: i64) -> Result<Vec<User>, StoreError> {
        self.find_users(doc! { "balance": { "$lt": threshold } }).await
    }
}

#[async_trait]
impl OrderRepository for MongoUnitOfWork {
    async fn find_all(&mut self) -> Result<Vec<Order>, StoreError> {
        self.find_orders(doc! {}).await
    }

    async fn find_by_id(&mut self, id: i64) -> Result<Option<Order>, StoreError> {
        let found = self
            .orders
            .find_one_with_session(doc! { "_id": id }, None, &mut self.session)
            .await?;
        Ok(found.map(Order::from))
    }

    async fn save(&mut self, order: Order) -> Result<Order, StoreError> {
        let id = match order.id {
            Some(id) => id,
            None => self.next_id(ORDERS).await?,
        };
        let document = OrderDocument::from_order(id, order);

        let result = self
            .orders
            .replace_one_with_session(
                doc! { "_id": id },
                &document,
                ReplaceOptions::builder().upsert(true).build(),
                &mut self.session,
            )
            .await?;
        if result.upserted_id.is_some() {
            self.bump_counter(ORDERS, id).await?;
        }

        Ok(Order::from(document))
    }

    async fn delete_by_id(&mut self, id: i64) -> Result<bool, StoreError> {
        let result = self
            .orders
            .delete_one_with_session(doc! { "_id": id }, None, &mut self.session)
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn find_by_item(&mut self, item: Item) -> Result<Vec<Order>, StoreError> {
        self.find_orders(doc! { "item": item.as_str() }).await
    }

    async fn find_by_price(&mut self, price: i64) -> Result<Vec<Order>, StoreError> {
        self.find_orders(doc! { "price": price }).await
    }

    async fn find_by_user(&mut self, user_id: i64) -> Result<Vec<Order>, StoreError> {
        self.find_orders(doc! { "user_id": user_id }).await
    }

    async fn delete_by_user(&mut self, user_id: i64) -> Result<u64, StoreError> {
        let result = self
            .orders
            .delete_many_with_session(doc! { "user_id": user_id }, None, &mut self.session)
            .await?;
        Ok(result.deleted_count)
    }
}
