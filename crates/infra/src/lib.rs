//! Infrastructure layer: product storage and configuration.

pub mod config;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use store::{InMemoryProductStore, PostgresProductStore, ProductStore, StoreError};
