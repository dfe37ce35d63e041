use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, ProductId};

use crate::input::INVALID_AMOUNT;

pub(crate) const NAME_REQUIRED: &str = "Name is required";
pub(crate) const DESCRIPTION_REQUIRED: &str = "Description is required";
pub(crate) const NEGATIVE_STOCK: &str = "Stock quantity cannot be negative";
pub(crate) const NEGATIVE_THRESHOLD: &str = "Low stock threshold cannot be negative";
pub(crate) const STOCK_OUT_OF_RANGE: &str = "Stock quantity is out of range";

/// A persisted product record.
///
/// `id`, `created_at` and `updated_at` are owned by the store; clients never
/// set them directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub stock_quantity: i64,
    pub low_stock_threshold: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated field set for a product that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub stock_quantity: i64,
    pub low_stock_threshold: i64,
}

/// Partial update: only `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub stock_quantity: Option<i64>,
    pub low_stock_threshold: Option<i64>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.stock_quantity.is_none()
            && self.low_stock_threshold.is_none()
    }
}

/// A strictly positive number of units to add to or remove from stock.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StockAmount(i64);

impl StockAmount {
    pub fn new(units: i64) -> DomainResult<Self> {
        if units <= 0 {
            return Err(DomainError::validation(INVALID_AMOUNT));
        }
        Ok(Self(units))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl Product {
    /// Materialize a new record from validated fields.
    pub fn create(id: ProductId, fields: NewProduct, now: DateTime<Utc>) -> DomainResult<Self> {
        let product = Self {
            id,
            name: fields.name,
            description: fields.description,
            stock_quantity: fields.stock_quantity,
            low_stock_threshold: fields.low_stock_threshold,
            created_at: now,
            updated_at: now,
        };
        product.validate()?;
        Ok(product)
    }

    /// Low stock is derived at read time, never stored.
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity < self.low_stock_threshold
    }

    /// Record-level schema checks, run before every write.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation(NAME_REQUIRED));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::validation(DESCRIPTION_REQUIRED));
        }
        if self.stock_quantity < 0 {
            return Err(DomainError::validation(NEGATIVE_STOCK));
        }
        if self.low_stock_threshold < 0 {
            return Err(DomainError::validation(NEGATIVE_THRESHOLD));
        }
        Ok(())
    }

    /// Merge `patch` into a copy of this record and validate the result.
    ///
    /// `self` is left untouched whether or not the merge succeeds.
    pub fn patched(&self, patch: &ProductPatch, now: DateTime<Utc>) -> DomainResult<Self> {
        let mut next = self.clone();
        if let Some(name) = &patch.name {
            next.name = name.trim().to_string();
        }
        if let Some(description) = &patch.description {
            next.description = description.trim().to_string();
        }
        if let Some(quantity) = patch.stock_quantity {
            next.stock_quantity = quantity;
        }
        if let Some(threshold) = patch.low_stock_threshold {
            next.low_stock_threshold = threshold;
        }
        next.validate()?;
        next.updated_at = now;
        Ok(next)
    }

    pub fn with_increase(&self, amount: StockAmount, now: DateTime<Utc>) -> DomainResult<Self> {
        let stock_quantity = self
            .stock_quantity
            .checked_add(amount.get())
            .ok_or_else(|| DomainError::validation(STOCK_OUT_OF_RANGE))?;
        Ok(Self {
            stock_quantity,
            updated_at: now,
            ..self.clone()
        })
    }

    pub fn with_decrease(&self, amount: StockAmount, now: DateTime<Utc>) -> DomainResult<Self> {
        if amount.get() > self.stock_quantity {
            return Err(DomainError::insufficient_stock(amount.get(), self.stock_quantity));
        }
        Ok(Self {
            stock_quantity: self.stock_quantity - amount.get(),
            updated_at: now,
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(stock_quantity: i64, low_stock_threshold: i64) -> Product {
        Product::create(
            ProductId::new(),
            NewProduct {
                name: "Widget".to_string(),
                description: "d".to_string(),
                stock_quantity,
                low_stock_threshold,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn create_rejects_negative_stock() {
        let err = Product::create(
            ProductId::new(),
            NewProduct {
                name: "Widget".to_string(),
                description: "d".to_string(),
                stock_quantity: -1,
                low_stock_threshold: 0,
            },
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, DomainError::validation(NEGATIVE_STOCK));
    }

    #[test]
    fn low_stock_is_strictly_less_than_threshold() {
        assert!(widget(4, 5).is_low_stock());
        assert!(!widget(5, 5).is_low_stock());
        assert!(!widget(6, 5).is_low_stock());
        assert!(!widget(0, 0).is_low_stock());
    }

    #[test]
    fn patch_applies_only_provided_fields() {
        let product = widget(10, 5);
        let patch = ProductPatch {
            name: Some("  Gadget ".to_string()),
            ..ProductPatch::default()
        };

        let updated = product.patched(&patch, Utc::now()).unwrap();

        assert_eq!(updated.name, "Gadget");
        assert_eq!(updated.description, product.description);
        assert_eq!(updated.stock_quantity, 10);
        assert_eq!(updated.low_stock_threshold, 5);
        assert_eq!(updated.created_at, product.created_at);
    }

    #[test]
    fn patch_that_breaks_schema_is_rejected() {
        let product = widget(10, 5);

        let blank = ProductPatch {
            description: Some("   ".to_string()),
            ..ProductPatch::default()
        };
        assert_eq!(
            product.patched(&blank, Utc::now()).unwrap_err(),
            DomainError::validation(DESCRIPTION_REQUIRED)
        );

        let negative = ProductPatch {
            low_stock_threshold: Some(-3),
            ..ProductPatch::default()
        };
        assert_eq!(
            product.patched(&negative, Utc::now()).unwrap_err(),
            DomainError::validation(NEGATIVE_THRESHOLD)
        );
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(ProductPatch::default().is_empty());
        assert!(
            !ProductPatch {
                stock_quantity: Some(0),
                ..ProductPatch::default()
            }
            .is_empty()
        );
    }

    #[test]
    fn stock_amount_must_be_positive() {
        assert!(StockAmount::new(0).is_err());
        assert!(StockAmount::new(-5).is_err());
        assert_eq!(StockAmount::new(3).unwrap().get(), 3);
    }

    #[test]
    fn decrease_beyond_stock_is_insufficient() {
        let product = widget(13, 5);
        let err = product
            .with_decrease(StockAmount::new(20).unwrap(), Utc::now())
            .unwrap_err();
        assert_eq!(err, DomainError::insufficient_stock(20, 13));
    }

    #[test]
    fn decrease_to_exactly_zero_is_allowed() {
        let product = widget(13, 5);
        let drained = product
            .with_decrease(StockAmount::new(13).unwrap(), Utc::now())
            .unwrap();
        assert_eq!(drained.stock_quantity, 0);
        assert!(drained.is_low_stock());
    }

    #[test]
    fn increase_overflow_is_a_validation_error() {
        let product = widget(i64::MAX - 1, 0);
        let err = product
            .with_increase(StockAmount::new(2).unwrap(), Utc::now())
            .unwrap_err();
        assert_eq!(err, DomainError::validation(STOCK_OUT_OF_RANGE));
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: increase then decrease by the same amount restores stock.
            #[test]
            fn increase_then_decrease_restores_stock(
                start in 0i64..1_000_000,
                units in 1i64..1_000_000,
            ) {
                let product = widget(start, 0);
                let amount = StockAmount::new(units).unwrap();

                let up = product.with_increase(amount, Utc::now()).unwrap();
                let down = up.with_decrease(amount, Utc::now()).unwrap();

                prop_assert_eq!(down.stock_quantity, start);
            }

            /// Property: stock never goes negative, whatever sequence of adjustments is tried.
            #[test]
            fn stock_never_negative(
                start in 0i64..1_000,
                ops in proptest::collection::vec((any::<bool>(), 1i64..500), 0..40),
            ) {
                let mut product = widget(start, 0);
                for (increase, units) in ops {
                    let amount = StockAmount::new(units).unwrap();
                    let before = product.stock_quantity;
                    let next = if increase {
                        product.with_increase(amount, Utc::now())
                    } else {
                        product.with_decrease(amount, Utc::now())
                    };
                    match next {
                        Ok(p) => product = p,
                        Err(DomainError::InsufficientStock { requested, available }) => {
                            prop_assert!(requested > available);
                            prop_assert_eq!(product.stock_quantity, before);
                        }
                        Err(e) => prop_assert!(false, "unexpected error: {e}"),
                    }
                    prop_assert!(product.stock_quantity >= 0);
                }
            }

            /// Property: low stock matches the strict field-to-field comparison.
            #[test]
            fn low_stock_matches_comparison(
                quantity in 0i64..100,
                threshold in 0i64..100,
            ) {
                prop_assert_eq!(widget(quantity, threshold).is_low_stock(), quantity < threshold);
            }
        }
    }
}
