use stockroom_infra::{config, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load `.env` before reading any variable, including RUST_LOG.
    let dotenv = config::load_dotenv();
    let config = AppConfig::from_env()?;
    stockroom_observability::init(&config.log_filter);

    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "environment variables loaded"),
        Err(e) => tracing::warn!("failed to load .env file: {e}"),
    }

    let store = stockroom_api::app::build_store(&config).await?;
    let app = stockroom_api::app::build_app(store);

    let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
