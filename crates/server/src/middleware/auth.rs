//! Session extractors.
//!
//! Handlers opt into authentication by taking [`RequireAuth`],
//! [`RequireAdmin`], or [`RequireCustomer`] as an argument. The token is
//! read from the `token` cookie set at login, with an `Authorization:
//! Bearer` header accepted as an alternative for non-browser clients.

use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::{StatusCode, header, request::Parts};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;

use bazaar_core::{Role, UserId};

use crate::services::auth::Claims;
use crate::state::AppState;

/// The session cookie name.
pub const SESSION_COOKIE: &str = "token";

/// The authenticated caller, as carried by a verified token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    pub role: Role,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: UserId::new(claims.sub),
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Rejection for a missing/invalid session or insufficient role.
#[derive(Debug)]
pub enum AuthRejection {
    Unauthorized,
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Insufficient permissions"),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Requires a valid session, any role.
pub struct RequireAuth(pub CurrentUser);

/// Requires a valid session with the `Admin` role.
pub struct RequireAdmin(pub CurrentUser);

/// Requires a valid session with the `Customer` role.
pub struct RequireCustomer(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state)?;
        if user.role == Role::Admin {
            Ok(Self(user))
        } else {
            Err(AuthRejection::Forbidden)
        }
    }
}

impl FromRequestParts<AppState> for RequireCustomer {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state)?;
        if user.role == Role::Customer {
            Ok(Self(user))
        } else {
            Err(AuthRejection::Forbidden)
        }
    }
}

fn authenticate(parts: &Parts, state: &AppState) -> Result<CurrentUser, AuthRejection> {
    let token = token_from_parts(parts).ok_or(AuthRejection::Unauthorized)?;
    let claims = state
        .jwt()
        .verify(&token)
        .map_err(|_| AuthRejection::Unauthorized)?;
    Ok(claims.into())
}

/// Pull the session token out of the request, cookie first.
fn token_from_parts(parts: &Parts) -> Option<String> {
    if let Some(cookies) = parts
        .headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
    {
        for pair in cookies.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=')
                && name == SESSION_COOKIE
                && !value.is_empty()
            {
                return Some(value.to_owned());
            }
        }
    }

    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with(name: &str, value: &str) -> Parts {
        let (parts, ()) = Request::builder()
            .header(name, value)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn test_token_from_cookie() {
        let parts = parts_with("cookie", "token=abc.def.ghi");
        assert_eq!(token_from_parts(&parts).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_token_from_cookie_among_others() {
        let parts = parts_with("cookie", "theme=dark; token=abc.def.ghi; lang=en");
        assert_eq!(token_from_parts(&parts).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_token_from_bearer_header() {
        let parts = parts_with("authorization", "Bearer abc.def.ghi");
        assert_eq!(token_from_parts(&parts).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_cookie_wins_over_header() {
        let (parts, ()) = Request::builder()
            .header("cookie", "token=from-cookie")
            .header("authorization", "Bearer from-header")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(token_from_parts(&parts).unwrap(), "from-cookie");
    }

    #[test]
    fn test_missing_token() {
        let (parts, ()) = Request::builder().body(()).unwrap().into_parts();
        assert!(token_from_parts(&parts).is_none());

        let empty = parts_with("cookie", "token=");
        assert!(token_from_parts(&empty).is_none());
    }

    #[test]
    fn test_non_bearer_authorization_is_ignored() {
        let parts = parts_with("authorization", "Basic dXNlcjpwYXNz");
        assert!(token_from_parts(&parts).is_none());
    }
}
