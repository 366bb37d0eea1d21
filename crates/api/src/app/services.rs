//! Infrastructure wiring: which resource store backs the API.

use std::sync::Arc;

use storefront_infra::{InMemoryResourceStore, PostgresResourceStore, ResourceStore, StoreError};

use crate::config::ApiConfig;

/// Shared state handed to the dispatcher through an `Extension`.
#[derive(Clone)]
pub struct AppServices {
    pub resources: Arc<dyn ResourceStore>,
    /// Path segment that marks where resource paths begin.
    pub function_prefix: String,
}

impl AppServices {
    pub fn new(resources: Arc<dyn ResourceStore>, function_prefix: impl Into<String>) -> Self {
        Self {
            resources,
            function_prefix: function_prefix.into(),
        }
    }
}

/// Postgres when `DATABASE_URL` is configured, otherwise a process-local
/// in-memory store.
pub async fn build_resources(config: &ApiConfig) -> Result<Arc<dyn ResourceStore>, StoreError> {
    match config.database_url.as_deref() {
        Some(url) => {
            let store = PostgresResourceStore::connect(url, config.database_max_connections).await?;
            store.ensure_schema().await?;
            tracing::info!(max_connections = config.database_max_connections, "using postgres resource store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory resource store (data is lost on restart)");
            Ok(InMemoryResourceStore::arc())
        }
    }
}
