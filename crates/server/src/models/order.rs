//! Order domain types.
//!
//! An order is created exactly once and thereafter only its `status` may
//! change. Line items and the total are a materialized snapshot of catalog
//! data at order time, so later catalog price changes never affect
//! historical billing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use bazaar_core::{Email, OrderId, OrderStatus, ProductId, UserId};

/// One product entry within an order.
///
/// Copies the product's descriptive fields plus the caller-supplied quantity
/// and line total, captured at order-creation time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    /// Catalog unit price at order time.
    pub price: Decimal,
    pub quantity: i32,
    /// Line total as supplied by the caller at checkout.
    pub total_price: Decimal,
}

/// A persisted order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    pub user_id: UserId,
    #[serde(rename = "productDetails")]
    pub line_items: Vec<LineItem>,
    /// Sum of the line totals at creation time; stored, never recomputed.
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An order that has been assembled but not yet persisted.
///
/// The order store turns this into an [`Order`] with a server-generated id
/// and timestamps in a single transactional write.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub status: OrderStatus,
    pub line_items: Vec<LineItem>,
    pub total_price: Decimal,
}

/// Public fields of the user owning an order, embedded in listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
}

/// An order enriched with the owning user's public fields for display.
///
/// Read-only denormalization used by the admin listing; the embedded summary
/// replaces the bare `userId` reference in the serialized form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithCustomer {
    pub id: OrderId,
    pub status: OrderStatus,
    #[serde(rename = "userId")]
    pub customer: CustomerSummary,
    #[serde(rename = "productDetails")]
    pub line_items: Vec<LineItem>,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
