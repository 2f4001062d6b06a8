//! Shoppost API - AWS Lambda Runtime

use lambda_http::{run, Error};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use shoppost_app::{body_limit_layer, build_cors_layer, create_app};
use shoppost_common::config::Config;
use shoppost_graph::{GraphConfig, InstagramServiceFactory};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .without_time()
        .init();

    info!("Initializing Shoppost API Lambda");

    let config =
        Config::from_env().map_err(|e| Error::from(format!("Configuration error: {}", e)))?;

    let pool = PgPool::connect(&config.database_url)
        .await
        .map_err(|e| Error::from(format!("Database error: {}", e)))?;

    info!("Database connection established");

    let graph_config =
        GraphConfig::from_env().map_err(|e| Error::from(format!("Graph error: {}", e)))?;
    let instagram = InstagramServiceFactory::create(graph_config)
        .map_err(|e| Error::from(format!("Graph error: {}", e)))?;

    let app = create_app(&config, pool, Arc::from(instagram))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(config.cors_allowed_origins.as_deref()))
        .layer(body_limit_layer());

    info!("Shoppost API Lambda ready to serve requests");

    run(app).await
}
