//! Storage gateways.
//!
//! Services never talk to a database directly: they open a [`UnitOfWork`] from
//! the shared [`Store`], go through the user/order gateways it exposes and then
//! commit or roll back the whole scope at once.

use async_trait::async_trait;

use crate::{
    error::StoreError,
    models::{Item, Order, User},
};

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[async_trait]
pub trait UserRepository: Send {
    async fn find_all(&mut self) -> Result<Vec<User>, StoreError>;

    async fn find_by_id(&mut self, id: i64) -> Result<Option<User>, StoreError>;

    /// Inserts when `user.id` is `None` (assigning a fresh id), replaces otherwise.
    async fn save(&mut self, user: User) -> Result<User, StoreError>;

    /// Returns whether a user was removed.
    async fn delete_by_id(&mut self, id: i64) -> Result<bool, StoreError>;

    async fn find_by_username(&mut self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_name(&mut self, name: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&mut self, email: &str) -> Result<Option<User>, StoreError>;

    /// Users whose balance is strictly below `threshold`.
    async fn find_all_with_low_balance(&mut self, threshold: i64) -> Result<Vec<User>, StoreError>;
}

#[async_trait]
pub trait OrderRepository: Send {
    async fn find_all(&mut self) -> Result<Vec<Order>, StoreError>;

    async fn find_by_id(&mut self, id: i64) -> Result<Option<Order>, StoreError>;

    async fn save(&mut self, order: Order) -> Result<Order, StoreError>;

    async fn delete_by_id(&mut self, id: i64) -> Result<bool, StoreError>;

    async fn find_by_item(&mut self, item: Item) -> Result<Vec<Order>, StoreError>;

    async fn find_by_price(&mut self, price: i64) -> Result<Vec<Order>, StoreError>;

    async fn find_by_user(&mut self, user_id: i64) -> Result<Vec<Order>, StoreError>;

    /// Returns how many orders were removed.
    async fn delete_by_user(&mut self, user_id: i64) -> Result<u64, StoreError>;
}

/// One atomic scope over both gateways.
///
/// Dropping a unit of work without committing discards everything done in it.
#[async_trait]
pub trait UnitOfWork: Send {
    fn users(&mut self) -> &mut dyn UserRepository;

    fn orders(&mut self) -> &mut dyn OrderRepository;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError>;

    /// Cheap round trip used by the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}
