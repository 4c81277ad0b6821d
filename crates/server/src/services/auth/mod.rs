//! Authentication and account service.
//!
//! Handles signup, login, and account updates. Passwords are hashed with
//! argon2; sessions are stateless JWTs issued by [`JwtKeys`].

mod error;
mod jwt;

pub use error::AuthError;
pub use jwt::{Claims, JwtKeys};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use bazaar_core::{Email, Role, UserId};

use crate::db::RepositoryError;
use crate::db::users::{NewUser, UserPatch, UserRepository};
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Signup / admin-created-account input.
#[derive(Debug)]
pub struct SignupInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub role: Role,
}

/// Partial account update.
///
/// Changing the password requires `check_password` to match the stored one.
#[derive(Debug, Default)]
pub struct UpdateUserInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub check_password: Option<String>,
    pub role: Option<Role>,
    pub phone_number: Option<String>,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    jwt: &'a JwtKeys,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, jwt: &'a JwtKeys) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt,
        }
    }

    /// Register a new account and issue a session token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid,
    /// `AuthError::WeakPassword` if the password doesn't meet requirements,
    /// and `AuthError::UserAlreadyExists` if the email is taken.
    pub async fn signup(&self, input: SignupInput) -> Result<(User, String), AuthError> {
        let email = Email::parse(&input.email)?;
        validate_password(&input.password)?;
        let password_hash = hash_password(&input.password)?;

        let user = self
            .users
            .create(NewUser {
                first_name: input.first_name,
                last_name: input.last_name,
                email,
                password_hash,
                role: input.role,
                phone_number: input.phone_number,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        let token = self.jwt.issue(&user)?;
        Ok((user, token))
    }

    /// Login with email and password, issuing a session token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .find_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let token = self.jwt.issue(&user)?;
        Ok((user, token))
    }

    /// Update an account's fields.
    ///
    /// A password change verifies `check_password` against the stored hash
    /// first; other fields are applied as-is when present.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the id does not resolve,
    /// `AuthError::InvalidCredentials` if `check_password` doesn't match,
    /// and `AuthError::UserAlreadyExists` if the new email is taken.
    pub async fn update_user(
        &self,
        id: UserId,
        input: UpdateUserInput,
    ) -> Result<User, AuthError> {
        let password_hash = match &input.password {
            Some(new_password) => {
                let current_hash = self
                    .users
                    .password_hash_by_id(id)
                    .await?
                    .ok_or(AuthError::UserNotFound)?;
                let check = input
                    .check_password
                    .as_deref()
                    .ok_or(AuthError::InvalidCredentials)?;
                verify_password(check, &current_hash)?;

                validate_password(new_password)?;
                Some(hash_password(new_password)?)
            }
            None => None,
        };

        let email = match &input.email {
            Some(raw) => Some(Email::parse(raw)?),
            None => None,
        };

        let user = self
            .users
            .update(
                id,
                UserPatch {
                    first_name: input.first_name,
                    last_name: input.last_name,
                    email,
                    password_hash,
                    role: input.role,
                    phone_number: input.phone_number,
                },
            )
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user)
    }
}

/// Validate a password against minimum requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password with argon2 and a fresh salt.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored argon2 hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_too_short() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_validate_password_ok() {
        assert!(validate_password("long enough password").is_ok());
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("same password").unwrap();
        let second = hash_password("same password").unwrap();
        assert_ne!(first, second);
    }
}
