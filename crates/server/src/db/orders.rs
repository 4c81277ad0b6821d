//! Order repository for database operations.
//!
//! An order spans two tables: an `orders` header row and its
//! `order_line_items`, written together in one transaction. Line items are
//! immutable after creation; only the header's `status` ever changes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use bazaar_core::{Email, OrderId, OrderStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::{CustomerSummary, LineItem, NewOrder, Order, OrderWithCustomer};
use crate::services::orders::OrderStore;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    status: String,
    user_id: UserId,
    total_price: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, line_items: Vec<LineItem>) -> Result<Order, RepositoryError> {
        Ok(Order {
            id: self.id,
            status: parse_status(&self.status)?,
            user_id: self.user_id,
            line_items,
            total_price: self.total_price,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderCustomerRow {
    #[sqlx(flatten)]
    order: OrderRow,
    first_name: String,
    last_name: String,
    email: String,
}

#[derive(sqlx::FromRow)]
struct LineItemRow {
    order_id: OrderId,
    product_id: ProductId,
    name: String,
    description: String,
    price: Decimal,
    quantity: i32,
    total_price: Decimal,
}

impl From<LineItemRow> for LineItem {
    fn from(row: LineItemRow) -> Self {
        Self {
            product_id: row.product_id,
            name: row.name,
            description: row.description,
            price: row.price,
            quantity: row.quantity,
            total_price: row.total_price,
        }
    }
}

fn parse_status(raw: &str) -> Result<OrderStatus, RepositoryError> {
    raw.parse::<OrderStatus>()
        .map_err(RepositoryError::DataCorruption)
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    async fn line_items_for(&self, id: OrderId) -> Result<Vec<LineItem>, RepositoryError> {
        let rows: Vec<LineItemRow> = sqlx::query_as(
            "SELECT order_id, product_id, name, description, price, quantity, total_price \
             FROM order_line_items WHERE order_id = $1 ORDER BY position",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(LineItem::from).collect())
    }

    /// Line items for a batch of orders, grouped by order id.
    async fn line_items_for_all(
        &self,
        ids: &[OrderId],
    ) -> Result<HashMap<OrderId, Vec<LineItem>>, RepositoryError> {
        let raw: Vec<i32> = ids.iter().map(OrderId::as_i32).collect();
        let rows: Vec<LineItemRow> = sqlx::query_as(
            "SELECT order_id, product_id, name, description, price, quantity, total_price \
             FROM order_line_items WHERE order_id = ANY($1) ORDER BY order_id, position",
        )
        .bind(&raw)
        .fetch_all(self.pool)
        .await?;

        let mut grouped: HashMap<OrderId, Vec<LineItem>> = HashMap::new();
        for row in rows {
            grouped
                .entry(row.order_id)
                .or_default()
                .push(LineItem::from(row));
        }
        Ok(grouped)
    }
}

impl OrderStore for OrderRepository<'_> {
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let header: OrderRow = sqlx::query_as(
            "INSERT INTO orders (status, user_id, total_price) \
             VALUES ($1, $2, $3) \
             RETURNING id, status, user_id, total_price, created_at, updated_at",
        )
        .bind(order.status.to_string())
        .bind(order.user_id)
        .bind(order.total_price)
        .fetch_one(&mut *tx)
        .await?;

        for (position, item) in order.line_items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO order_line_items \
                     (order_id, product_id, name, description, price, quantity, \
                      total_price, position) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(header.id)
            .bind(item.product_id)
            .bind(&item.name)
            .bind(&item.description)
            .bind(item.price)
            .bind(item.quantity)
            .bind(item.total_price)
            .bind(i32::try_from(position).unwrap_or(i32::MAX))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        header.into_order(order.line_items)
    }

    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(
            "SELECT id, status, user_id, total_price, created_at, updated_at \
             FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(header) => {
                let line_items = self.line_items_for(header.id).await?;
                Ok(Some(header.into_order(line_items)?))
            }
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> Result<Vec<OrderWithCustomer>, RepositoryError> {
        let rows: Vec<OrderCustomerRow> = sqlx::query_as(
            "SELECT o.id, o.status, o.user_id, o.total_price, o.created_at, o.updated_at, \
                    u.first_name, u.last_name, u.email \
             FROM orders o \
             JOIN users u ON u.id = o.user_id \
             ORDER BY o.created_at DESC, o.id DESC",
        )
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<OrderId> = rows.iter().map(|r| r.order.id).collect();
        let mut lines = self.line_items_for_all(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let email = Email::parse(&row.email).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
                })?;
                Ok(OrderWithCustomer {
                    id: row.order.id,
                    status: parse_status(&row.order.status)?,
                    customer: CustomerSummary {
                        id: row.order.user_id,
                        first_name: row.first_name,
                        last_name: row.last_name,
                        email,
                    },
                    line_items: lines.remove(&row.order.id).unwrap_or_default(),
                    total_price: row.order.total_price,
                    created_at: row.order.created_at,
                    updated_at: row.order.updated_at,
                })
            })
            .collect()
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(
            "UPDATE orders SET status = $1, updated_at = now() \
             WHERE id = $2 \
             RETURNING id, status, user_id, total_price, created_at, updated_at",
        )
        .bind(status.to_string())
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(header) => {
                let line_items = self.line_items_for(header.id).await?;
                Ok(Some(header.into_order(line_items)?))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        // Fetch the full order first so the caller gets its final state;
        // the line items go with it via ON DELETE CASCADE.
        let order = self.get_by_id(id).await?;
        if order.is_some() {
            sqlx::query("DELETE FROM orders WHERE id = $1")
                .bind(id)
                .execute(self.pool)
                .await?;
        }
        Ok(order)
    }
}
