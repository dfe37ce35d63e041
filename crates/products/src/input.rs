//! Raw client input and the validation that turns it into write models.
//!
//! Numeric fields arrive either as JSON numbers or as numeric strings; both
//! are accepted as long as they denote a finite whole number.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockroom_core::{DomainError, DomainResult};

use crate::product::{NewProduct, ProductPatch, StockAmount};

pub const FIELDS_REQUIRED: &str = "All fields are required";
pub const INVALID_NUMBERS: &str = "Stock quantity and threshold must be valid numbers";
pub const NEGATIVE_NUMBERS: &str = "Stock quantity and threshold cannot be negative";
pub const EMPTY_UPDATE: &str = "No update data provided";
pub const INVALID_AMOUNT: &str = "Amount must be a positive number";

/// Why a numeric input could not be read as a whole number.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum NumberError {
    #[error("not a number")]
    NotANumber,
    #[error("not a whole number")]
    NotWhole,
    #[error("outside the supported range")]
    OutOfRange,
}

/// A JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(serde_json::Number),
    Text(String),
}

impl From<i64> for NumericInput {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl NumericInput {
    /// Read the input as a whole number.
    pub fn to_whole(&self) -> Result<i64, NumberError> {
        match self {
            Self::Number(n) => {
                if let Some(v) = n.as_i64() {
                    return Ok(v);
                }
                if n.is_u64() {
                    return Err(NumberError::OutOfRange);
                }
                n.as_f64()
                    .ok_or(NumberError::NotANumber)
                    .and_then(whole_from_float)
            }
            Self::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Err(NumberError::NotANumber);
                }
                if let Ok(v) = s.parse::<i64>() {
                    return Ok(v);
                }
                s.parse::<f64>()
                    .map_err(|_| NumberError::NotANumber)
                    .and_then(whole_from_float)
            }
        }
    }
}

fn whole_from_float(f: f64) -> Result<i64, NumberError> {
    if !f.is_finite() {
        return Err(NumberError::NotANumber);
    }
    if f.fract() != 0.0 {
        return Err(NumberError::NotWhole);
    }
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
    if f < i64::MIN as f64 || f >= i64::MAX as f64 {
        return Err(NumberError::OutOfRange);
    }
    Ok(f as i64)
}

/// Body of a create request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub stock_quantity: Option<NumericInput>,
    pub low_stock_threshold: Option<NumericInput>,
}

impl CreateProductInput {
    pub fn validate(&self) -> DomainResult<NewProduct> {
        let name = non_blank(self.name.as_deref());
        let description = non_blank(self.description.as_deref());
        let (Some(name), Some(description), Some(stock), Some(threshold)) = (
            name,
            description,
            self.stock_quantity.as_ref(),
            self.low_stock_threshold.as_ref(),
        ) else {
            return Err(DomainError::validation(FIELDS_REQUIRED));
        };

        let (Ok(stock_quantity), Ok(low_stock_threshold)) = (stock.to_whole(), threshold.to_whole())
        else {
            return Err(DomainError::validation(INVALID_NUMBERS));
        };

        if stock_quantity < 0 || low_stock_threshold < 0 {
            return Err(DomainError::validation(NEGATIVE_NUMBERS));
        }

        Ok(NewProduct {
            name: name.to_string(),
            description: description.to_string(),
            stock_quantity,
            low_stock_threshold,
        })
    }
}

/// Body of an update request; absent or `null` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub stock_quantity: Option<NumericInput>,
    pub low_stock_threshold: Option<NumericInput>,
}

impl UpdateProductInput {
    /// Only shape checks happen here; range and required-field rules are
    /// enforced on the merged record by [`crate::Product::patched`].
    pub fn validate(&self) -> DomainResult<ProductPatch> {
        let parse = |field: &Option<NumericInput>| -> DomainResult<Option<i64>> {
            field
                .as_ref()
                .map(|raw| raw.to_whole().map_err(|_| DomainError::validation(INVALID_NUMBERS)))
                .transpose()
        };

        let patch = ProductPatch {
            name: self.name.clone(),
            description: self.description.clone(),
            stock_quantity: parse(&self.stock_quantity)?,
            low_stock_threshold: parse(&self.low_stock_threshold)?,
        };
        if patch.is_empty() {
            return Err(DomainError::validation(EMPTY_UPDATE));
        }
        Ok(patch)
    }
}

/// Body of an increase/decrease request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockAdjustmentInput {
    pub amount: Option<NumericInput>,
}

impl StockAdjustmentInput {
    pub fn validate(&self) -> DomainResult<StockAmount> {
        let units = self
            .amount
            .as_ref()
            .and_then(|raw| raw.to_whole().ok())
            .ok_or_else(|| DomainError::validation(INVALID_AMOUNT))?;
        StockAmount::new(units)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
