//! Storefront Catalog - product display service

use anyhow::Result;
use storefront_catalog::{api, config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load_app_config()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.as_str().into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = api::build_state(&config)?;
    tracing::info!(products = state.catalog.len(), basis = ?state.price_basis, "catalog ready");
    let app = api::build_app(state);

    tracing::info!("Storefront catalog listening on {}", config.bind_addr);
    axum::serve(tokio::net::TcpListener::bind(config.bind_addr).await?, app).await?;
    Ok(())
}
