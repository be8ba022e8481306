use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    error::StoreError,
    models::{Item, Order, User},
};

use super::{OrderRepository, Store, UnitOfWork, UserRepository};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    orders: BTreeMap<i64, Order>,
    last_user_id: i64,
    last_order_id: i64,
}

/// Process-local store.
///
/// A unit of work holds the table lock for its whole lifetime and works on a
/// private copy, so units of work are serialized and only committed copies are
/// ever visible.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryUnitOfWork { guard, working }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    fn users(&mut self) -> &mut dyn UserRepository {
        self
    }

    fn orders(&mut self) -> &mut dyn OrderRepository {
        self
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryUnitOfWork { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}

fn matching_users(tables: &Tables, pred: impl Fn(&User) -> bool) -> Vec<User> {
    tables.users.values().filter(|&u| pred(u)).cloned().collect()
}

fn matching_orders(tables: &Tables, pred: impl Fn(&Order) -> bool) -> Vec<Order> {
    tables.orders.values().filter(|&o| pred(o)).cloned().collect()
}

#[async_trait]
impl UserRepository for MemoryUnitOfWork {
    async fn find_all(&mut self) -> Result<Vec<User>, StoreError> {
        Ok(matching_users(&self.working, |_| true))
    }

    async fn find_by_id(&mut self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn save(&mut self, mut user: User) -> Result<User, StoreError> {
        let id = match user.id {
            Some(id) => id,
            None => {
                self.working.last_user_id += 1;
                self.working.last_user_id
            }
        };
        self.working.last_user_id = self.working.last_user_id.max(id);

        user.id = Some(id);
        self.working.users.insert(id, user.clone());
        Ok(user)
    }

    async fn delete_by_id(&mut self, id: i64) -> Result<bool, StoreError> {
        Ok(self.working.users.remove(&id).is_some())
    }

    async fn find_by_username(&mut self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(matching_users(&self.working, |u| u.username == username).into_iter().next())
    }

    async fn find_by_name(&mut self, name: &str) -> Result<Option<User>, StoreError> {
        Ok(matching_users(&self.working, |u| u.name == name).into_iter().next())
    }

    async fn find_by_email(&mut self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(matching_users(&self.working, |u| u.email == email).into_iter().next())
    }

    async fn find_all_with_low_balance(&mut self, threshold: i64) -> Result<Vec<User>, StoreError> {
        Ok(matching_users(&self.working, |u| u.balance < threshold))
    }
}

#[async_trait]
impl OrderRepository for MemoryUnitOfWork {
    async fn find_all(&mut self) -> Result<Vec<Order>, StoreError> {
        Ok(matching_orders(&self.working, |_| true))
    }

    async fn find_by_id(&mut self, id: i64) -> Result<Option<Order>, StoreError> {
        Ok(self.working.orders.get(&id).cloned())
    }

    async fn save(&mut self, mut order: Order) -> Result<Order, StoreError> {
        let id = match order.id {
            Some(id) => id,
            None => {
                self.working.last_order_id += 1;
                self.working.last_order_id
            }
        };
        self.working.last_order_id = self.working.last_order_id.max(id);

        order.id = Some(id);
        self.working.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn delete_by_id(&mut self, id: i64) -> Result<bool, StoreError> {
        Ok(self.working.orders.remove(&id).is_some())
    }

    async fn find_by_item(&mut self, item: Item) -> Result<Vec<Order>, StoreError> {
        Ok(matching_orders(&self.working, |o| o.item == item))
    }

    async fn find_by_price(&mut self, price: i64) -> Result<Vec<Order>, StoreError> {
        Ok(matching_orders(&self.working, |o| o.price == price))
    }

    async fn find_by_user(&mut self, user_id: i64) -> Result<Vec<Order>, StoreError> {
        Ok(matching_orders(&self.working, |o| o.user_id == Some(user_id)))
    }

    async fn delete_by_user(&mut self, user_id: i64) -> Result<u64, StoreError> {
        let before = self.working.orders.len();
        self.working.orders.retain(|_, o| o.user_id != Some(user_id));
        Ok((before - self.working.orders.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_assigns_increasing_ids() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();

        let first = uow.users().save(User::new(None, "a", "A", "a@x.io", 10)).await.unwrap();
        let second = uow.users().save(User::new(None, "b", "B", "b@x.io", 20)).await.unwrap();

        assert_eq!(first.id, Some(1));
        assert_eq!(second.id, Some(2));
    }

    #[tokio::test]
    async fn rollback_discards_changes() {
        let store = MemoryStore::new();

        let mut uow = store.begin().await.unwrap();
        uow.users().save(User::new(None, "a", "A", "a@x.io", 10)).await.unwrap();
        uow.rollback().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        assert!(uow.users().find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn dropped_unit_of_work_is_not_committed() {
        let store = MemoryStore::new();

        {
            let mut uow = store.begin().await.unwrap();
            uow.users().save(User::new(None, "a", "A", "a@x.io", 10)).await.unwrap();
        }

        let mut uow = store.begin().await.unwrap();
        assert!(uow.users().find_by_id(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn commit_publishes_changes() {
        let store = MemoryStore::new();

        let mut uow = store.begin().await.unwrap();
        uow.users().save(User::new(None, "a", "A", "a@x.io", 10)).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        let found = uow.users().find_by_username("a").await.unwrap();
        assert_eq!(found.map(|u| u.balance), Some(10));
    }

    #[tokio::test]
    async fn low_balance_threshold_is_exclusive() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        uow.users().save(User::new(None, "a", "A", "a@x.io", 100)).await.unwrap();
        uow.users().save(User::new(None, "b", "B", "b@x.io", 99)).await.unwrap();

        let low = uow.users().find_all_with_low_balance(100).await.unwrap();

        assert_eq!(low.len(), 1);
        assert_eq!(low[0].username, "b");
    }

    #[tokio::test]
    async fn delete_by_user_removes_only_that_users_orders() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        uow.orders().save(Order::new(None, Item::Box1, 1, Some(1))).await.unwrap();
        uow.orders().save(Order::new(None, Item::Box2, 2, Some(1))).await.unwrap();
        uow.orders().save(Order::new(None, Item::Box3, 3, Some(2))).await.unwrap();

        assert_eq!(uow.orders().delete_by_user(1).await.unwrap(), 2);

        let left = uow.orders().find_all().await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].user_id, Some(2));
    }

    #[tokio::test]
    async fn explicit_id_moves_the_sequence_forward() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        uow.users().save(User::new(Some(10), "a", "Ann", "ann@x.io", 0)).await.unwrap();

        let next = uow.users().save(User::new(None, "b", "Bo", "bo@x.io", 0)).await.unwrap();
        assert_eq!(next.id, Some(11));

        assert_eq!(uow.users().find_by_name("Ann").await.unwrap().and_then(|u| u.id), Some(10));
        assert_eq!(uow.users().find_by_email("bo@x.io").await.unwrap().and_then(|u| u.id), Some(11));
        assert!(uow.users().find_by_email("nobody@x.io").await.unwrap().is_none());
    }
}
