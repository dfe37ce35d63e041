//! Postgres-backed product store.
//!
//! The table mirrors the product schema, including `CHECK` constraints for
//! the non-negative counters. Stock adjustments are single conditional
//! `UPDATE ... RETURNING` statements, so they are atomic per record without
//! explicit locking; patch merges run in a `SELECT ... FOR UPDATE`
//! transaction so validation sees the row it is about to overwrite.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use stockroom_core::{DomainError, ProductId};
use stockroom_products::{NewProduct, Product, ProductPatch, StockAmount};

use super::{ProductStore, StoreError};

const COLUMNS: &str =
    "id, name, description, stock_quantity, low_stock_threshold, created_at, updated_at";

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id                  UUID PRIMARY KEY,
    name                TEXT NOT NULL,
    description         TEXT NOT NULL,
    stock_quantity      BIGINT NOT NULL CHECK (stock_quantity >= 0),
    low_stock_threshold BIGINT NOT NULL DEFAULT 0 CHECK (low_stock_threshold >= 0),
    created_at          TIMESTAMPTZ NOT NULL,
    updated_at          TIMESTAMPTZ NOT NULL
)
"#;

/// Postgres SQLSTATE for `check_violation`.
const CHECK_VIOLATION: &str = "23514";

pub struct PostgresProductStore {
    pool: PgPool,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url` and make sure the table exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        tracing::debug!("products table ready");
        Ok(())
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    Ok(Product {
        id: ProductId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        stock_quantity: row.try_get("stock_quantity")?,
        low_stock_threshold: row.try_get("low_stock_threshold")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Constraint violations become validation failures; everything else stays a database error.
fn classify(err: sqlx::Error) -> StoreError {
    let message = err
        .as_database_error()
        .filter(|db| db.code().as_deref() == Some(CHECK_VIOLATION))
        .map(|db| db.message().to_string());
    match message {
        Some(message) => StoreError::Validation(DomainError::validation(message)),
        None => StoreError::Database(err),
    }
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    async fn create(&self, fields: NewProduct) -> Result<Product, StoreError> {
        let product = Product::create(ProductId::new(), fields, Utc::now())?;

        let row = sqlx::query(&format!(
            "INSERT INTO products ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {COLUMNS}"
        ))
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.stock_quantity)
        .bind(product.low_stock_threshold)
        .bind(product.created_at)
        .bind(product.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)?;

        product_from_row(&row)
    }

    async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM products ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(product_from_row).collect()
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM products WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(product_from_row).transpose()
    }

    async fn update_by_id(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM products WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let next = product_from_row(&row)?.patched(&patch, Utc::now())?;

        let row = sqlx::query(&format!(
            "UPDATE products \
             SET name = $2, description = $3, stock_quantity = $4, low_stock_threshold = $5, updated_at = $6 \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(&next.name)
        .bind(&next.description)
        .bind(next.stock_quantity)
        .bind(next.low_stock_threshold)
        .bind(next.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify)?;

        tx.commit().await?;
        product_from_row(&row).map(Some)
    }

    async fn delete_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(&format!(
            "DELETE FROM products WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(product_from_row).transpose()
    }

    async fn find_low_stock(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM products \
             WHERE stock_quantity < low_stock_threshold \
             ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(product_from_row).collect()
    }

    async fn increase_stock(
        &self,
        id: ProductId,
        amount: StockAmount,
    ) -> Result<Option<Product>, StoreError> {
        loop {
            let row = sqlx::query(&format!(
                "UPDATE products \
                 SET stock_quantity = stock_quantity + $2, updated_at = $3 \
                 WHERE id = $1 AND stock_quantity <= $4 \
                 RETURNING {COLUMNS}"
            ))
            .bind(id.as_uuid())
            .bind(amount.get())
            .bind(Utc::now())
            .bind(i64::MAX - amount.get())
            .fetch_optional(&self.pool)
            .await?;

            if let Some(row) = row {
                return product_from_row(&row).map(Some);
            }

            // Either the record is gone or the increment would overflow. The
            // domain check reports the overflow; if the row changed in between,
            // try the update again.
            match self.find_by_id(id).await? {
                None => return Ok(None),
                Some(current) => {
                    current.with_increase(amount, Utc::now())?;
                }
            }
        }
    }

    async fn decrease_stock(
        &self,
        id: ProductId,
        amount: StockAmount,
    ) -> Result<Option<Product>, StoreError> {
        loop {
            let row = sqlx::query(&format!(
                "UPDATE products \
                 SET stock_quantity = stock_quantity - $2, updated_at = $3 \
                 WHERE id = $1 AND stock_quantity >= $2 \
                 RETURNING {COLUMNS}"
            ))
            .bind(id.as_uuid())
            .bind(amount.get())
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

            if let Some(row) = row {
                return product_from_row(&row).map(Some);
            }

            match self.find_by_id(id).await? {
                None => return Ok(None),
                Some(current) => {
                    current.with_decrease(amount, Utc::now())?;
                }
            }
        }
    }
}
