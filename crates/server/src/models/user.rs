//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{Email, Role, UserId};

/// A registered account.
///
/// The password hash never leaves the repository layer; this type carries
/// only the fields that are safe to serialize in API responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    /// Email address, unique across accounts.
    pub email: Email,
    /// Role gating mutations (order transitions require `Admin`).
    pub role: Role,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
