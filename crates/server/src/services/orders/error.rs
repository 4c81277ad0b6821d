//! Order service error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during order assembly and lifecycle operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Structural validation failed (empty cart or missing fields).
    #[error("all fields are required")]
    MissingField,

    /// The order's owning user does not exist.
    #[error("user not found")]
    UserNotFound,

    /// A cart line references a product that does not exist.
    #[error("product not found")]
    ProductNotFound,

    /// The order id does not resolve.
    #[error("order not found")]
    OrderNotFound,

    /// The caller's role does not permit this operation.
    #[error("insufficient role for this operation")]
    Forbidden,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
