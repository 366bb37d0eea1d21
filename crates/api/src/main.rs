use anyhow::Context;

use storefront_api::app::{build_app, services::build_resources};
use storefront_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    storefront_observability::init();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    let resources = build_resources(&config).await.context("failed to open resource store")?;
    let app = build_app(&config, resources);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %listener.local_addr()?, prefix = %config.function_prefix, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
