//! Product operations: validate input, call the store, classify failures.
//!
//! These are transport-agnostic. The HTTP layer in `routes/` only extracts
//! inputs and maps the outcome to a response.

use std::sync::Arc;

use thiserror::Error;

use stockroom_core::{DomainError, ProductId};
use stockroom_infra::{ProductStore, StoreError};
use stockroom_products::{CreateProductInput, Product, StockAdjustmentInput, UpdateProductInput};

pub const PRODUCT_NOT_FOUND: &str = "Product not found";
pub const NO_PRODUCTS: &str = "No products found";
pub const NO_LOW_STOCK_PRODUCTS: &str = "No low stock products found";
pub const ID_REQUIRED: &str = "Product ID is required";
pub const INVALID_ID: &str = "Invalid product ID format";

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed, missing, or out-of-range client data (including ids).
    #[error("{0}")]
    InvalidInput(String),

    /// Well-formed id with no record, or an empty collection.
    #[error("{0}")]
    NotFound(&'static str),

    #[error("Insufficient stock")]
    InsufficientStock { requested: i64, available: i64 },

    /// Unexpected store failure; the detail is logged, never returned.
    #[error("Internal server error")]
    Internal(#[source] StoreError),
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::InvalidInput(msg),
            DomainError::InvalidId(_) => Self::InvalidInput(INVALID_ID.to_string()),
            DomainError::InsufficientStock {
                requested,
                available,
            } => Self::InsufficientStock {
                requested,
                available,
            },
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Stateless product operations over an injected store handle.
#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn ProductStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, input: &CreateProductInput) -> ServiceResult<Product> {
        let fields = input.validate()?;
        let product = self
            .store
            .create(fields)
            .await
            .map_err(|e| classify("create_product", e))?;
        tracing::info!(product_id = %product.id, "product created");
        Ok(product)
    }

    /// An empty store is reported as `NotFound`, not as an empty list.
    pub async fn list(&self) -> ServiceResult<Vec<Product>> {
        let products = self
            .store
            .find_all()
            .await
            .map_err(|e| classify("list_products", e))?;
        if products.is_empty() {
            return Err(ServiceError::NotFound(NO_PRODUCTS));
        }
        Ok(products)
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Product> {
        let id = parse_id(id)?;
        self.store
            .find_by_id(id)
            .await
            .map_err(|e| classify("get_product", e))?
            .ok_or(ServiceError::NotFound(PRODUCT_NOT_FOUND))
    }

    pub async fn update(&self, id: &str, input: &UpdateProductInput) -> ServiceResult<Product> {
        let id = parse_id(id)?;
        let patch = input.validate()?;
        let product = self
            .store
            .update_by_id(id, patch)
            .await
            .map_err(|e| classify("update_product", e))?
            .ok_or(ServiceError::NotFound(PRODUCT_NOT_FOUND))?;
        tracing::info!(product_id = %product.id, "product updated");
        Ok(product)
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let id = parse_id(id)?;
        self.store
            .delete_by_id(id)
            .await
            .map_err(|e| classify("delete_product", e))?
            .ok_or(ServiceError::NotFound(PRODUCT_NOT_FOUND))?;
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    pub async fn increase_stock(
        &self,
        id: &str,
        input: &StockAdjustmentInput,
    ) -> ServiceResult<Product> {
        let id = parse_id(id)?;
        let amount = input.validate()?;
        let product = self
            .store
            .increase_stock(id, amount)
            .await
            .map_err(|e| classify("increase_stock", e))?
            .ok_or(ServiceError::NotFound(PRODUCT_NOT_FOUND))?;
        tracing::info!(
            product_id = %id,
            amount = amount.get(),
            stock_quantity = product.stock_quantity,
            "stock increased"
        );
        Ok(product)
    }

    /// Fails with `InsufficientStock` (record untouched) when `amount` exceeds stock on hand.
    pub async fn decrease_stock(
        &self,
        id: &str,
        input: &StockAdjustmentInput,
    ) -> ServiceResult<Product> {
        let id = parse_id(id)?;
        let amount = input.validate()?;
        let product = self
            .store
            .decrease_stock(id, amount)
            .await
            .map_err(|e| classify("decrease_stock", e))?
            .ok_or(ServiceError::NotFound(PRODUCT_NOT_FOUND))?;
        tracing::info!(
            product_id = %id,
            amount = amount.get(),
            stock_quantity = product.stock_quantity,
            "stock decreased"
        );
        Ok(product)
    }

    /// Products whose stock is strictly below their own threshold.
    pub async fn low_stock(&self) -> ServiceResult<Vec<Product>> {
        let products = self
            .store
            .find_low_stock()
            .await
            .map_err(|e| classify("low_stock_products", e))?;
        if products.is_empty() {
            return Err(ServiceError::NotFound(NO_LOW_STOCK_PRODUCTS));
        }
        Ok(products)
    }
}

fn parse_id(raw: &str) -> ServiceResult<ProductId> {
    if raw.trim().is_empty() {
        return Err(ServiceError::InvalidInput(ID_REQUIRED.to_string()));
    }
    Ok(raw.parse::<ProductId>()?)
}

fn classify(operation: &'static str, err: StoreError) -> ServiceError {
    match err {
        StoreError::Validation(domain) => domain.into(),
        StoreError::InsufficientStock {
            requested,
            available,
        } => ServiceError::InsufficientStock {
            requested,
            available,
        },
        other => {
            tracing::error!(operation, error = %other, "product store failure");
            ServiceError::Internal(other)
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use stockroom_infra::InMemoryProductStore;
    use stockroom_products::{NewProduct, NumericInput, ProductPatch, StockAmount};

    use super::*;

    fn service() -> ProductService {
        ProductService::new(Arc::new(InMemoryProductStore::new()))
    }

    fn create_input(name: &str, stock: i64, threshold: i64) -> CreateProductInput {
        CreateProductInput {
            name: Some(name.to_string()),
            description: Some("d".to_string()),
            stock_quantity: Some(NumericInput::from(stock)),
            low_stock_threshold: Some(NumericInput::from(threshold)),
        }
    }

    fn amount(units: i64) -> StockAdjustmentInput {
        StockAdjustmentInput {
            amount: Some(NumericInput::from(units)),
        }
    }

    /// A store whose every call fails, for exercising the internal-failure path.
    struct BrokenStore;

    fn outage() -> StoreError {
        StoreError::Unavailable("connection refused by 10.0.0.7".to_string())
    }

    #[async_trait]
    impl ProductStore for BrokenStore {
        async fn create(&self, _fields: NewProduct) -> Result<Product, StoreError> {
            Err(outage())
        }
        async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
            Err(outage())
        }
        async fn find_by_id(&self, _id: ProductId) -> Result<Option<Product>, StoreError> {
            Err(outage())
        }
        async fn update_by_id(
            &self,
            _id: ProductId,
            _patch: ProductPatch,
        ) -> Result<Option<Product>, StoreError> {
            Err(outage())
        }
        async fn delete_by_id(&self, _id: ProductId) -> Result<Option<Product>, StoreError> {
            Err(outage())
        }
        async fn find_low_stock(&self) -> Result<Vec<Product>, StoreError> {
            Err(outage())
        }
        async fn increase_stock(
            &self,
            _id: ProductId,
            _amount: StockAmount,
        ) -> Result<Option<Product>, StoreError> {
            Err(outage())
        }
        async fn decrease_stock(
            &self,
            _id: ProductId,
            _amount: StockAmount,
        ) -> Result<Option<Product>, StoreError> {
            Err(outage())
        }
    }

    #[tokio::test]
    async fn widget_stock_scenario() {
        let svc = service();

        let created = svc.create(&create_input("Widget", 10, 5)).await.unwrap();
        assert_eq!(created.stock_quantity, 10);
        assert_eq!(created.low_stock_threshold, 5);
        assert!(!created.id.to_string().is_empty());
        let id = created.id.to_string();

        let up = svc.increase_stock(&id, &amount(3)).await.unwrap();
        assert_eq!(up.stock_quantity, 13);

        let err = svc.decrease_stock(&id, &amount(20)).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InsufficientStock {
                requested: 20,
                available: 13
            }
        ));
        assert_eq!(svc.get(&id).await.unwrap().stock_quantity, 13);

        let drained = svc.decrease_stock(&id, &amount(13)).await.unwrap();
        assert_eq!(drained.stock_quantity, 0);

        let low = svc.low_stock().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].id, created.id);
    }

    #[tokio::test]
    async fn empty_collections_are_not_found() {
        let svc = service();
        assert!(matches!(
            svc.list().await.unwrap_err(),
            ServiceError::NotFound(NO_PRODUCTS)
        ));
        assert!(matches!(
            svc.low_stock().await.unwrap_err(),
            ServiceError::NotFound(NO_LOW_STOCK_PRODUCTS)
        ));

        svc.create(&create_input("Plenty", 10, 5)).await.unwrap();
        assert_eq!(svc.list().await.unwrap().len(), 1);
        assert!(matches!(
            svc.low_stock().await.unwrap_err(),
            ServiceError::NotFound(NO_LOW_STOCK_PRODUCTS)
        ));
    }

    #[tokio::test]
    async fn low_stock_excludes_products_at_threshold() {
        let svc = service();
        let below = svc.create(&create_input("below", 4, 5)).await.unwrap();
        svc.create(&create_input("at", 5, 5)).await.unwrap();
        svc.create(&create_input("above", 6, 5)).await.unwrap();

        let ids: Vec<_> = svc.low_stock().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![below.id]);
    }

    #[tokio::test]
    async fn malformed_and_unknown_ids_are_distinguished() {
        let svc = service();

        match svc.get("not-a-valid-id").await.unwrap_err() {
            ServiceError::InvalidInput(msg) => assert_eq!(msg, INVALID_ID),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
        match svc.get("  ").await.unwrap_err() {
            ServiceError::InvalidInput(msg) => assert_eq!(msg, ID_REQUIRED),
            other => panic!("expected InvalidInput, got {other:?}"),
        }

        let unassigned = ProductId::new().to_string();
        assert!(matches!(
            svc.get(&unassigned).await.unwrap_err(),
            ServiceError::NotFound(PRODUCT_NOT_FOUND)
        ));
        assert!(matches!(
            svc.delete(&unassigned).await.unwrap_err(),
            ServiceError::NotFound(PRODUCT_NOT_FOUND)
        ));
        assert!(matches!(
            svc.increase_stock(&unassigned, &amount(1)).await.unwrap_err(),
            ServiceError::NotFound(PRODUCT_NOT_FOUND)
        ));
        assert!(matches!(
            svc.decrease_stock(&unassigned, &amount(1)).await.unwrap_err(),
            ServiceError::NotFound(PRODUCT_NOT_FOUND)
        ));

        let rename = UpdateProductInput {
            name: Some("Gadget".to_string()),
            ..UpdateProductInput::default()
        };
        assert!(matches!(
            svc.update(&unassigned, &rename).await.unwrap_err(),
            ServiceError::NotFound(PRODUCT_NOT_FOUND)
        ));
    }

    #[tokio::test]
    async fn invalid_amount_is_rejected_before_touching_the_record() {
        let svc = service();
        let created = svc.create(&create_input("Widget", 10, 5)).await.unwrap();
        let id = created.id.to_string();

        for bad in [amount(0), amount(-5), StockAdjustmentInput::default()] {
            assert!(matches!(
                svc.increase_stock(&id, &bad).await.unwrap_err(),
                ServiceError::InvalidInput(_)
            ));
            assert!(matches!(
                svc.decrease_stock(&id, &bad).await.unwrap_err(),
                ServiceError::InvalidInput(_)
            ));
        }
        assert_eq!(svc.get(&id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn update_merges_and_revalidates() {
        let svc = service();
        let created = svc.create(&create_input("Widget", 10, 5)).await.unwrap();
        let id = created.id.to_string();

        let rename = UpdateProductInput {
            name: Some("Gadget".to_string()),
            ..UpdateProductInput::default()
        };
        let updated = svc.update(&id, &rename).await.unwrap();
        assert_eq!(updated.name, "Gadget");
        assert_eq!(updated.stock_quantity, 10);

        let negative = UpdateProductInput {
            stock_quantity: Some(NumericInput::from(-1_i64)),
            ..UpdateProductInput::default()
        };
        assert!(matches!(
            svc.update(&id, &negative).await.unwrap_err(),
            ServiceError::InvalidInput(_)
        ));
        assert_eq!(svc.get(&id).await.unwrap(), updated);

        match svc.update(&id, &UpdateProductInput::default()).await.unwrap_err() {
            ServiceError::InvalidInput(msg) => assert_eq!(msg, "No update data provided"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let svc = service();
        let created = svc.create(&create_input("Widget", 1, 0)).await.unwrap();
        let id = created.id.to_string();

        svc.delete(&id).await.unwrap();

        assert!(matches!(
            svc.get(&id).await.unwrap_err(),
            ServiceError::NotFound(PRODUCT_NOT_FOUND)
        ));
    }

    #[tokio::test]
    async fn store_failures_surface_as_internal_without_detail() {
        let svc = ProductService::new(Arc::new(BrokenStore));

        let err = svc.list().await.unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)));
        assert_eq!(err.to_string(), "Internal server error");

        let err = svc.create(&create_input("Widget", 1, 0)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)));
    }

    #[tokio::test]
    async fn validation_happens_before_the_store_is_called() {
        // BrokenStore fails every call, so a client error proves no call was made.
        let svc = ProductService::new(Arc::new(BrokenStore));

        let missing = CreateProductInput {
            name: Some("Widget".to_string()),
            ..CreateProductInput::default()
        };
        assert!(matches!(
            svc.create(&missing).await.unwrap_err(),
            ServiceError::InvalidInput(_)
        ));
        assert!(matches!(
            svc.get("bogus").await.unwrap_err(),
            ServiceError::InvalidInput(_)
        ));
    }
}
