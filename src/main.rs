//! Storefront Catalog - product listings, search, cart and wishlist service

use anyhow::{Context, Result};
use storefront_catalog::api::{self, AppState};
use storefront_catalog::{CatalogService, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "storefront_catalog=info,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let catalog = CatalogService::from_json_file(&config.catalog_path)
        .with_context(|| format!("loading catalog from {}", config.catalog_path.display()))?
        .with_paginated_search(config.paginate_search);
    tracing::info!(products = catalog.len(), path = %config.catalog_path.display(), "Catalog loaded");
    if !config.latency.is_zero() {
        tracing::warn!(latency_ms = config.latency.as_millis() as u64, "Simulated catalog latency enabled");
    }

    let app = api::router(AppState::new(catalog, config.latency));
    let addr = config.socket_addr();
    tracing::info!("🚀 Storefront catalog listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
