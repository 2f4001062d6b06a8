//! Shoppost application composition root
//!
//! Composes the domain routers and shared HTTP middleware into a single
//! application. Used by both the local server and the Lambda binary.

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    Router,
};
use shoppost_auth::{AuthBackend, AuthConfig};
use shoppost_common::Config;
use shoppost_graph::InstagramService;
use shoppost_products::{ProductsRepositories, ProductsState};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Request bodies are small JSON documents
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Create the main application router with all routes
pub fn create_app(config: &Config, pool: PgPool, instagram: Arc<dyn InstagramService>) -> Router {
    let auth = AuthBackend::new(AuthConfig {
        jwt_secret: config.jwt_secret.clone(),
        issuer: config.jwt_issuer.clone(),
        audience: config.jwt_audience.clone(),
    });

    let products_state = ProductsState {
        repos: ProductsRepositories::new(pool),
        auth,
        instagram,
    };

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .route(
            "/",
            axum::routing::get(|| async { "Shoppost API v0.0.1-SNAPSHOT" }),
        )
        .merge(shoppost_products::routes().with_state(products_state))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// CORS for the admin UI.
///
/// `origins` is a comma-separated allow list; `None` allows any origin.
pub fn build_cors_layer(origins: Option<&str>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let Some(origins) = origins else {
        return base.allow_origin(Any);
    };

    let allowed: Vec<HeaderValue> = origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    base.allow_origin(allowed)
}

/// Cap request body size
pub fn body_limit_layer() -> DefaultBodyLimit {
    DefaultBodyLimit::max(MAX_BODY_BYTES)
}
