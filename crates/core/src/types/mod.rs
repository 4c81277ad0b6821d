//! Core types for Bazaar.
//!
//! Newtype wrappers and enums shared across the workspace.

pub mod email;
pub mod id;
pub mod status;

pub use email::{Email, EmailError};
pub use id::{OrderId, ProductId, UserId};
pub use status::{OrderStatus, Role};
