pub mod user;
pub mod order;

pub use user::User;
pub use order::{Item, Order};
