//! Product catalog endpoints.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use bazaar_core::ProductId;

use crate::db::products::{NewProduct, PriceRange, ProductPatch, ProductRepository};
use crate::error::ApiError;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/last4", get(last_four))
        .route("/paginate", get(paginate))
        .route("/name", post(by_name))
        .route("/id", post(by_id))
        .route("/price", post(by_price))
        .route("/", get(index).post(create).patch(update).delete(destroy))
}

#[derive(Debug, Deserialize)]
struct PaginateQuery {
    #[serde(default)]
    offset: i64,
    #[serde(default = "default_page_size")]
    limit: i64,
}

const fn default_page_size() -> i64 {
    12
}

#[derive(Debug, Deserialize)]
struct NameRequest {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ProductIdRequest {
    id: ProductId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceRequest {
    price_ranges: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CreateProductRequest {
    name: String,
    description: String,
    price: Decimal,
}

#[derive(Debug, Deserialize)]
struct UpdateProductRequest {
    id: ProductId,
    name: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
}

/// GET / — the full catalog, newest first.
async fn index(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let products = ProductRepository::new(state.pool()).list_all().await?;
    Ok(Json(products))
}

/// GET /last4 — the four most recently added products.
async fn last_four(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let products = ProductRepository::new(state.pool()).last_four().await?;
    Ok(Json(products))
}

/// GET /paginate — a page of the catalog.
async fn paginate(
    State(state): State<AppState>,
    Query(query): Query<PaginateQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if query.offset < 0 || query.limit <= 0 {
        return Err(ApiError::BadRequest(
            "Invalid pagination parameters.".to_owned(),
        ));
    }

    let products = ProductRepository::new(state.pool())
        .list_paginated(query.offset, query.limit)
        .await?;
    Ok(Json(products))
}

/// POST /name — lookup by exact name.
async fn by_name(
    State(state): State<AppState>,
    Json(body): Json<NameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let product = ProductRepository::new(state.pool())
        .find_by_name(&body.name)
        .await?
        .ok_or_else(|| ApiError::NotFound("No such a product".to_owned()))?;

    Ok(Json(product))
}

/// POST /id — lookup by id, id in the body.
async fn by_id(
    State(state): State<AppState>,
    Json(body): Json<ProductIdRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let product = ProductRepository::new(state.pool())
        .find_by_id(body.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No such a product".to_owned()))?;

    Ok(Json(product))
}

/// POST /price — filter by one or more "min-max" price bands.
async fn by_price(
    State(state): State<AppState>,
    Json(body): Json<PriceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ranges = parse_price_ranges(&body.price_ranges)?;
    let products = ProductRepository::new(state.pool())
        .by_price_ranges(&ranges)
        .await?;

    Ok(Json(products))
}

/// POST / — add a product to the catalog.
async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let product = ProductRepository::new(state.pool())
        .create(NewProduct {
            name: body.name,
            description: body.description,
            price: body.price,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// PATCH / — partial product update, id in the body.
async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let product = ProductRepository::new(state.pool())
        .update(
            body.id,
            ProductPatch {
                name: body.name,
                description: body.description,
                price: body.price,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_owned()))?;

    Ok(Json(product))
}

/// DELETE / — remove a product, id in the body.
async fn destroy(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<ProductIdRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = ProductRepository::new(state.pool()).delete(body.id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Product not found".to_owned()));
    }

    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

/// Parse `"min-max"` band strings into validated ranges.
fn parse_price_ranges(raw: &[String]) -> Result<Vec<PriceRange>, ApiError> {
    if raw.is_empty() {
        return Err(ApiError::BadRequest(
            "Invalid or empty priceRanges array.".to_owned(),
        ));
    }

    raw.iter()
        .map(|band| {
            let (min, max) = band
                .split_once('-')
                .ok_or_else(invalid_range)?;
            let min: Decimal = min.trim().parse().map_err(|_| invalid_range())?;
            let max: Decimal = max.trim().parse().map_err(|_| invalid_range())?;
            if min >= max {
                return Err(invalid_range());
            }
            Ok(PriceRange { min, max })
        })
        .collect()
}

fn invalid_range() -> ApiError {
    ApiError::BadRequest("Invalid price range format.".to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_price_ranges() {
        let ranges = parse_price_ranges(&["10-50".to_owned(), "99.50-200".to_owned()]).unwrap();
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].min, dec("10"));
        assert_eq!(ranges[0].max, dec("50"));
        assert_eq!(ranges[1].min, dec("99.50"));
    }

    #[test]
    fn test_parse_price_ranges_rejects_empty() {
        assert!(matches!(
            parse_price_ranges(&[]),
            Err(ApiError::BadRequest(msg)) if msg == "Invalid or empty priceRanges array."
        ));
    }

    #[test]
    fn test_parse_price_ranges_rejects_garbage() {
        for bad in ["cheap", "10", "abc-def", "50-10", "10-10"] {
            assert!(
                matches!(
                    parse_price_ranges(&[bad.to_owned()]),
                    Err(ApiError::BadRequest(_))
                ),
                "expected rejection for {bad:?}"
            );
        }
    }
}
