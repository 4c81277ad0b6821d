//! Domain models for the Bazaar API.
//!
//! These types represent validated domain objects separate from database row
//! types; the repositories in [`crate::db`] map rows into them.

pub mod order;
pub mod product;
pub mod user;

pub use order::{CustomerSummary, LineItem, NewOrder, Order, OrderWithCustomer};
pub use product::Product;
pub use user::User;
