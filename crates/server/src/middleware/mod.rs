//! Request middleware and extractors.

pub mod auth;

pub use auth::{
    AuthRejection, CurrentUser, RequireAdmin, RequireAuth, RequireCustomer, SESSION_COOKIE,
};
