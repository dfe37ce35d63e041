//! Products domain module.
//!
//! This crate contains the business rules for product records and their stock
//! counters, implemented purely as deterministic domain logic (no IO, no HTTP,
//! no storage).

pub mod input;
pub mod product;

pub use input::{CreateProductInput, NumberError, NumericInput, StockAdjustmentInput, UpdateProductInput};
pub use product::{NewProduct, Product, ProductPatch, StockAmount};
