//! Token issuance and verification.
//!
//! Sessions are stateless HS256 JWTs carried in an HTTP-only cookie (or a
//! bearer header). The signature and `exp` claim are validated on every
//! request; nothing is stored server-side.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use bazaar_core::Role;

use super::AuthError;
use crate::models::User;

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i32,
    pub email: String,
    pub role: Role,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

/// Signing and verification keys derived from the configured secret.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    /// Derive keys from the configured secret.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_hours: u64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        let hours = i64::try_from(ttl_hours).unwrap_or(24);
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl: Duration::hours(hours),
        }
    }

    /// Issue a session token for a user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if signing fails.
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.as_i32(),
            email: user.email.to_string(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|_| AuthError::InvalidToken)
    }

    /// Verify a token's signature and expiry, returning its claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for tampered, malformed, or expired
    /// tokens.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 30;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|t| t.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use bazaar_core::{Email, UserId};

    use super::*;

    fn test_user() -> User {
        let now = Utc::now();
        User {
            id: UserId::new(7),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: Email::parse("ada@example.com").unwrap(),
            role: Role::Admin,
            phone_number: "555-0100".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn keys() -> JwtKeys {
        JwtKeys::new(&SecretString::from("k9$mQ2!vX7@pL4#nR8^wZ3&tY6*uB1%e"), 24)
    }

    #[test]
    fn test_issue_verify_roundtrip() {
        let keys = keys();
        let token = keys.issue(&test_user()).unwrap();

        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_rejects_tampered_token() {
        let keys = keys();
        let token = keys.issue(&test_user()).unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('A') { 'B' } else { 'A' });

        assert!(matches!(
            keys.verify(&tampered),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = keys().issue(&test_user()).unwrap();
        let other = JwtKeys::new(&SecretString::from("f3#hJ8@qW1!sD6^gK9&xC4*vN7%mZ2$a"), 24);

        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let keys = keys();
        let now = Utc::now();
        let claims = Claims {
            sub: 7,
            email: "ada@example.com".to_string(),
            role: Role::Admin,
            iat: (now - Duration::hours(48)).timestamp(),
            exp: (now - Duration::hours(24)).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();

        assert!(matches!(keys.verify(&token), Err(AuthError::InvalidToken)));
    }
}
