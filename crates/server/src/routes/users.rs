//! User and session endpoints.

use axum::extract::State;
use axum::http::header;
use axum::response::{AppendHeaders, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use bazaar_core::{Role, UserId};

use crate::db::users::UserRepository;
use crate::error::ApiError;
use crate::middleware::{RequireAdmin, RequireAuth, SESSION_COOKIE};
use crate::services::auth::{AuthService, SignupInput, UpdateUserInput};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/logged-in-user", get(logged_in_user))
        .route("/byId", post(by_id))
        .route("/", post(create).get(index).patch(update).delete(destroy))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignupRequest {
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    phone_number: String,
    role: Option<Role>,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct UserIdRequest {
    id: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateUserRequest {
    id: UserId,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    check_password: Option<String>,
    role: Option<Role>,
    phone_number: Option<String>,
}

/// The session cookie sent with signup and login responses.
fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; HttpOnly; Secure; SameSite=None; Path=/")
}

/// An immediately-expiring cookie that clears the session.
fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; Secure; SameSite=None; Path=/; Max-Age=0")
}

/// POST /signup — register a customer account and start a session.
async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let auth = AuthService::new(state.pool(), state.jwt());
    let (user, token) = auth
        .signup(SignupInput {
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            password: body.password,
            phone_number: body.phone_number,
            role: Role::Customer,
        })
        .await?;

    Ok((
        AppendHeaders([(header::SET_COOKIE, session_cookie(&token))]),
        Json(user),
    ))
}

/// POST / — admin-created account, defaults to the `Admin` role.
async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let auth = AuthService::new(state.pool(), state.jwt());
    let (user, _token) = auth
        .signup(SignupInput {
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            password: body.password,
            phone_number: body.phone_number,
            role: body.role.unwrap_or(Role::Admin),
        })
        .await?;

    Ok(Json(user))
}

/// POST /login — verify credentials and start a session.
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let auth = AuthService::new(state.pool(), state.jwt());
    let (_user, token) = auth.login(&body.email, &body.password).await?;

    Ok((
        AppendHeaders([(header::SET_COOKIE, session_cookie(&token))]),
        Json(json!({ "message": "Login successful" })),
    ))
}

/// POST /logout — clear the session cookie.
async fn logout(RequireAuth(_user): RequireAuth) -> impl IntoResponse {
    (
        AppendHeaders([(header::SET_COOKIE, clear_session_cookie())]),
        Json(json!({ "message": "Logout successful" })),
    )
}

/// GET /logged-in-user — the caller as carried by their token.
async fn logged_in_user(RequireAuth(user): RequireAuth) -> impl IntoResponse {
    Json(json!({ "user": user }))
}

/// GET / — all accounts, newest first.
async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let users = UserRepository::new(state.pool()).list_all().await?;
    Ok(Json(users))
}

/// POST /byId — a single account, id in the body.
async fn by_id(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<UserIdRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = UserRepository::new(state.pool())
        .find_by_id(body.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_owned()))?;

    Ok(Json(user))
}

/// PATCH / — partial account update; password changes require the current
/// password in `checkPassword`.
async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let auth = AuthService::new(state.pool(), state.jwt());
    let user = auth
        .update_user(
            body.id,
            UpdateUserInput {
                first_name: body.first_name,
                last_name: body.last_name,
                email: body.email,
                password: body.password,
                check_password: body.check_password,
                role: body.role,
                phone_number: body.phone_number,
            },
        )
        .await?;

    Ok(Json(user))
}

/// DELETE / — remove an account, id in the body.
async fn destroy(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<UserIdRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = UserRepository::new(state.pool()).delete(body.id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_owned()));
    }

    Ok(Json(json!({ "message": "User deleted successfully" })))
}
