//! Product repository for database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use bazaar_core::ProductId;

use super::RepositoryError;
use crate::models::Product;
use crate::services::orders::CatalogLookup;

const PRODUCT_COLUMNS: &str = "id, name, description, price, created_at, updated_at";

/// A new catalog entry.
#[derive(Debug)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

/// Partial product update; `None` fields are left unchanged.
#[derive(Debug, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
}

/// An inclusive price band used by range search.
#[derive(Debug, Clone, Copy)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the full catalog, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// The four most recently added products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn last_four(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id DESC LIMIT 4"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// A page of the catalog, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_paginated(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             ORDER BY created_at DESC, id DESC OFFSET $1 LIMIT $2"
        ))
        .bind(offset)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Get a product by its exact name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Resolve a set of product ids in one query.
    ///
    /// Unknown ids are absent from the result; no error is raised for them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<Product>, RepositoryError> {
        let raw: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)"
        ))
        .bind(&raw)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Products whose price falls into any of the given bands, priciest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn by_price_ranges(
        &self,
        ranges: &[PriceRange],
    ) -> Result<Vec<Product>, RepositoryError> {
        if ranges.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE "
        ));
        let mut separated = builder.separated(" OR ");
        for range in ranges {
            separated
                .push("(price >= ")
                .push_bind_unseparated(range.min)
                .push_unseparated(" AND price <= ")
                .push_bind_unseparated(range.max)
                .push_unseparated(")");
        }
        builder.push(" ORDER BY price DESC, id DESC");

        let rows: Vec<ProductRow> = builder.build_query_as().fetch_all(self.pool).await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Add a product to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let row: ProductRow = sqlx::query_as(&format!(
            "INSERT INTO products (name, description, price) \
             VALUES ($1, $2, $3) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Apply a partial update, leaving absent fields unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "UPDATE products SET \
                 name = COALESCE($1, name), \
                 description = COALESCE($2, description), \
                 price = COALESCE($3, price), \
                 updated_at = now() \
             WHERE id = $4 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(patch.name.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.price)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Remove a product from the catalog.
    ///
    /// Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl CatalogLookup for ProductRepository<'_> {
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        Self::find_by_ids(self, ids).await
    }
}
