//! HTTP application wiring.
//!
//! - `services.rs`: which resource store backs the API
//! - `routes/`: the route table, the dispatcher, and one handler file per area
//! - `dto.rs`: request bodies and parsing helpers
//! - `errors.rs`: the response envelope and error mapping

use std::sync::Arc;

use axum::{Extension, Router, routing::any};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use storefront_auth::Hs256JwtValidator;
use storefront_infra::ResourceStore;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router.
///
/// Every path is authenticated and handed to the dispatcher, which owns
/// routing; axum only sees a catch-all.
pub fn build_app(config: &ApiConfig, resources: Arc<dyn ResourceStore>) -> Router {
    let auth_state = middleware::AuthState {
        jwt: Arc::new(Hs256JwtValidator::new(config.jwt_secret.as_bytes())),
    };
    let services = Arc::new(services::AppServices::new(resources, config.function_prefix.clone()));

    Router::new()
        .route("/", any(routes::dispatch))
        .route("/*rest", any(routes::dispatch))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(Extension(services))
                .layer(axum::middleware::from_fn_with_state(auth_state, middleware::auth_middleware)),
        )
}
