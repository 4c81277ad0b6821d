//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use bazaar_core::{Email, Role, UserId};

use super::RepositoryError;
use crate::models::User;
use crate::services::orders::IdentityLookup;

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, role, phone_number, created_at, updated_at";

/// A new account, password already hashed.
#[derive(Debug)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub password_hash: String,
    pub role: Role,
    pub phone_number: String,
}

/// Partial account update; `None` fields are left unchanged.
#[derive(Debug, Default)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<Email>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub phone_number: Option<String>,
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    first_name: String,
    last_name: String,
    email: String,
    role: String,
    phone_number: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = row
            .role
            .parse::<Role>()
            .map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: UserId::new(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email,
            role,
            phone_number: row.phone_number,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails and
    /// `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id.as_i32())
                .fetch_optional(self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user and their password hash by email.
    ///
    /// Returns `None` if no account exists for the email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row: Option<CredentialRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(cred) => Ok(Some((User::try_from(cred.user)?, cred.password_hash))),
            None => Ok(None),
        }
    }

    /// Get just the password hash for a user id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn password_hash_by_id(
        &self,
        id: UserId,
    ) -> Result<Option<String>, RepositoryError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT password_hash FROM users WHERE id = $1")
                .bind(id.as_i32())
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(|(hash,)| hash))
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists and
    /// `RepositoryError::Database` for other database errors.
    pub async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO users (first_name, last_name, email, password_hash, role, phone_number) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .bind(&user.phone_number)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        User::try_from(row)
    }

    /// List all users, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    /// Apply a partial update, leaving absent fields unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new email already exists
    /// and `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: UserId,
        patch: UserPatch,
    ) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "UPDATE users SET \
                 first_name = COALESCE($1, first_name), \
                 last_name = COALESCE($2, last_name), \
                 email = COALESCE($3, email), \
                 password_hash = COALESCE($4, password_hash), \
                 role = COALESCE($5, role), \
                 phone_number = COALESCE($6, phone_number), \
                 updated_at = now() \
             WHERE id = $7 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(patch.first_name.as_deref())
        .bind(patch.last_name.as_deref())
        .bind(patch.email.as_ref().map(Email::as_str))
        .bind(patch.password_hash.as_deref())
        .bind(patch.role.map(|r| r.to_string()))
        .bind(patch.phone_number.as_deref())
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.map(User::try_from).transpose()
    }

    /// Delete an account.
    ///
    /// Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl IdentityLookup for UserRepository<'_> {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Self::find_by_id(self, id).await
    }
}
