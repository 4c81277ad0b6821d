//! Order endpoints.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use bazaar_core::{OrderId, OrderStatus, UserId};

use crate::db::orders::OrderRepository;
use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::error::ApiError;
use crate::middleware::{RequireAdmin, RequireCustomer};
use crate::services::orders::{CartLine, OrderService};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(index).patch(edit).delete(destroy))
        .route("/byId", post(by_id))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderRequest {
    user_id: UserId,
    product_details: Vec<CartLine>,
}

#[derive(Debug, Deserialize)]
struct EditOrderRequest {
    id: OrderId,
    status: OrderStatus,
}

#[derive(Debug, Deserialize)]
struct OrderIdRequest {
    id: OrderId,
}

fn service(
    state: &AppState,
) -> OrderService<OrderRepository<'_>, ProductRepository<'_>, UserRepository<'_>> {
    OrderService::new(
        OrderRepository::new(state.pool()),
        ProductRepository::new(state.pool()),
        UserRepository::new(state.pool()),
    )
}

/// POST / — assemble and persist an order from the caller's cart.
async fn create(
    RequireCustomer(_user): RequireCustomer,
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = service(&state)
        .create_order(body.user_id, &body.product_details)
        .await?;

    Ok(Json(order))
}

/// GET / — all orders with customer summaries, newest first.
async fn index(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = service(&state).list_orders().await?;
    Ok(Json(orders))
}

/// POST /byId — a single order, id in the body.
async fn by_id(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<OrderIdRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = service(&state).get_order(body.id).await?;
    Ok(Json(json!({ "data": order })))
}

/// PATCH / — set an order's status.
async fn edit(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<EditOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = service(&state)
        .transition_status(user.role, body.id, body.status)
        .await?;

    Ok(Json(json!({ "editedOrder": order })))
}

/// DELETE / — remove an order, returning its final state.
async fn destroy(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<OrderIdRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = service(&state).delete_order(body.id).await?;

    Ok(Json(json!({
        "message": "Order deleted successfully",
        "data": order,
    })))
}
