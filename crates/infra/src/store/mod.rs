//! Product storage: the collaborator contract the operations depend on.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use stockroom_core::{DomainError, ProductId};
use stockroom_products::{NewProduct, Product, ProductPatch, StockAmount};

pub use in_memory::InMemoryProductStore;
pub use postgres::PostgresProductStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The write would produce a record that breaks the product schema.
    #[error("validation failed: {0}")]
    Validation(DomainError),

    /// A guarded decrement found fewer units than requested.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<DomainError> for StoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InsufficientStock {
                requested,
                available,
            } => Self::InsufficientStock {
                requested,
                available,
            },
            other => Self::Validation(other),
        }
    }
}

/// Durable product storage.
///
/// Every write re-validates the resulting record with [`Product::validate`], and
/// each single-record mutation is applied atomically: a failed write leaves the
/// stored record unchanged. Methods returning `Option` yield `None` when no
/// record has the given id.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Persist a new record; the store assigns the id and both timestamps.
    async fn create(&self, fields: NewProduct) -> Result<Product, StoreError>;

    /// All records, oldest first.
    async fn find_all(&self) -> Result<Vec<Product>, StoreError>;

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Merge `patch` into the stored record and validate the merged result.
    async fn update_by_id(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError>;

    /// Remove a record, returning what was removed.
    async fn delete_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Records whose `stock_quantity` is below their own `low_stock_threshold`.
    async fn find_low_stock(&self) -> Result<Vec<Product>, StoreError>;

    /// Atomic `stock_quantity += amount`.
    async fn increase_stock(
        &self,
        id: ProductId,
        amount: StockAmount,
    ) -> Result<Option<Product>, StoreError>;

    /// Atomic `stock_quantity -= amount`, applied only if enough stock is on hand.
    async fn decrease_stock(
        &self,
        id: ProductId,
        amount: StockAmount,
    ) -> Result<Option<Product>, StoreError>;
}

#[async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn create(&self, fields: NewProduct) -> Result<Product, StoreError> {
        (**self).create(fields).await
    }

    async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        (**self).find_all().await
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn update_by_id(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        (**self).update_by_id(id, patch).await
    }

    async fn delete_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).delete_by_id(id).await
    }

    async fn find_low_stock(&self) -> Result<Vec<Product>, StoreError> {
        (**self).find_low_stock().await
    }

    async fn increase_stock(
        &self,
        id: ProductId,
        amount: StockAmount,
    ) -> Result<Option<Product>, StoreError> {
        (**self).increase_stock(id, amount).await
    }

    async fn decrease_stock(
        &self,
        id: ProductId,
        amount: StockAmount,
    ) -> Result<Option<Product>, StoreError> {
        (**self).decrease_stock(id, amount).await
    }
}
