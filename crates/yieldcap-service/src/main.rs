//! Yieldcap Service - HTTP API for the yield ledger
//!
//! This is the main entry point for the yieldcap service.

use std::sync::Arc;

use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yieldcap_service::bootstrap::bootstrap_root;
use yieldcap_service::{create_router, AppState, ServiceConfig};
use yieldcap_store::RocksStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,yieldcap=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Yieldcap Service");

    // Load configuration from environment
    let config = ServiceConfig::from_env().map_err(|e| {
        tracing::error!(error = %e, "Refusing to start");
        e
    })?;

    tracing::info!(
        listen_addr = %config.listen_addr,
        data_dir = %config.data_dir,
        jwt_ttl_hours = config.jwt_ttl_hours,
        admin_configured = %config.admin_key.is_some(),
        bootstrap_configured = %config.bootstrap.is_some(),
        "Service configuration loaded"
    );

    // Initialize RocksDB store
    tracing::info!(path = %config.data_dir, "Opening RocksDB store");
    let store = Arc::new(RocksStore::open(&config.data_dir)?);

    if let Some(bootstrap) = &config.bootstrap {
        bootstrap_root(store.as_ref(), bootstrap, Utc::now())?;
    }

    // Build app state
    let state = AppState::new(store, config.clone());

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
