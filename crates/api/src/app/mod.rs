//! HTTP API application wiring (Axum router + service wiring).
//!
//! This folder is structured like:
//! - `services.rs`: product operations over an injected store
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs and JSON envelopes
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use stockroom_infra::{AppConfig, InMemoryProductStore, PostgresProductStore, ProductStore};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::ProductService;

/// Build the full HTTP router over `store` (public entrypoint used by `main.rs` and tests).
pub fn build_app(store: Arc<dyn ProductStore>) -> Router {
    let services = ProductService::new(store);

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(services))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// Pick the store implementation from configuration.
pub async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ProductStore>> {
    match &config.database_url {
        Some(url) => {
            let store = PostgresProductStore::connect(url, config.db_max_connections)
                .await
                .context("failed to connect to Postgres")?;
            tracing::info!(
                max_connections = config.db_max_connections,
                "using Postgres product store"
            );
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory product store");
            Ok(Arc::new(InMemoryProductStore::new()))
        }
    }
}
