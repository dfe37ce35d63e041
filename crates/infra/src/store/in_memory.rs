use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use stockroom_core::ProductId;
use stockroom_products::{NewProduct, Product, ProductPatch, StockAmount};

use super::{ProductStore, StoreError};

/// In-memory product store for tests/dev.
///
/// Each mutation runs its read-modify-write under a single write guard, so
/// concurrent adjustments to the same record never lose an update.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    inner: RwLock<BTreeMap<ProductId, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<ProductId, Product>>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("product store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<ProductId, Product>>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("product store lock poisoned".to_string()))
    }

    /// Replace a record with `f(record)` if it exists and `f` succeeds.
    fn modify<F>(&self, id: ProductId, f: F) -> Result<Option<Product>, StoreError>
    where
        F: FnOnce(&Product) -> Result<Product, StoreError>,
    {
        let mut map = self.write()?;
        let Some(current) = map.get(&id) else {
            return Ok(None);
        };
        let next = f(current)?;
        next.validate()?;
        map.insert(id, next.clone());
        Ok(Some(next))
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn create(&self, fields: NewProduct) -> Result<Product, StoreError> {
        let product = Product::create(ProductId::new(), fields, Utc::now())?;
        self.write()?.insert(product.id, product.clone());
        Ok(product)
    }

    async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.read()?.values().cloned().collect())
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn update_by_id(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        self.modify(id, |current| Ok(current.patched(&patch, Utc::now())?))
    }

    async fn delete_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.write()?.remove(&id))
    }

    async fn find_low_stock(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self
            .read()?
            .values()
            .filter(|p| p.is_low_stock())
            .cloned()
            .collect())
    }

    async fn increase_stock(
        &self,
        id: ProductId,
        amount: StockAmount,
    ) -> Result<Option<Product>, StoreError> {
        self.modify(id, |current| Ok(current.with_increase(amount, Utc::now())?))
    }

    async fn decrease_stock(
        &self,
        id: ProductId,
        amount: StockAmount,
    ) -> Result<Option<Product>, StoreError> {
        self.modify(id, |current| Ok(current.with_decrease(amount, Utc::now())?))
    }
}
