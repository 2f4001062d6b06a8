//! Shoppost Graph Service
//!
//! Talks to the Instagram Graph API on behalf of one business account:
//! - `GraphClient`: reqwest implementation used in production
//! - `MockInstagramService`: programmable mock for tests and local development
//! - `InstagramServiceFactory`: picks one from `GraphConfig`
//!
//! Publishing is a two-step protocol on the provider side. A media container
//! is created from a public image URL and caption, then published, which
//! returns the id of the live post. Product tags are attached to the live post
//! afterwards.

pub mod client;
pub mod mock;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://graph.facebook.com";
pub const DEFAULT_API_VERSION: &str = "v19.0";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Upper bound on a single Graph call. Must stay well below the stale
/// publish claim age so an abandoned request cannot outlive its claim.
pub const MAX_TIMEOUT_SECS: u64 = 60;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Graph configuration error: {0}")]
    Configuration(String),

    #[error("Graph request error: {0}")]
    Request(String),

    #[error("Graph response error: {0}")]
    Response(String),

    #[error("Graph API error ({status}, code {code:?}): {message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    #[error("Graph API rate limit exceeded")]
    RateLimit,
}

/// Input for creating an image media container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerRequest {
    pub image_url: String,
    pub caption: String,
}

/// A provider-side staging object that is not yet visible
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaContainer {
    pub id: String,
}

/// A live post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedMedia {
    pub id: String,
}

/// Links a spot on the post image to a catalog product.
///
/// `x` and `y` are relative coordinates in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductTag {
    pub product_id: String,
    pub x: f64,
    pub y: f64,
}

/// Graph service configuration
#[derive(Clone)]
pub struct GraphConfig {
    /// `graph` or `mock`
    pub provider: String,
    pub access_token: String,
    /// Instagram business account id that owns the posts
    pub ig_user_id: String,
    pub base_url: String,
    pub api_version: String,
    /// Total time allowed for one Graph API request
    pub timeout: Duration,
}

impl std::fmt::Debug for GraphConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphConfig")
            .field("provider", &self.provider)
            .field("access_token", &"[REDACTED]")
            .field("ig_user_id", &self.ig_user_id)
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GraphConfig {
    /// Create Graph config from environment variables
    pub fn from_env() -> Result<Self, GraphError> {
        let provider = std::env::var("GRAPH_PROVIDER").unwrap_or_else(|_| "mock".to_string());
        let timeout_secs = match std::env::var("GRAPH_API_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                GraphError::Configuration(format!("Invalid GRAPH_API_TIMEOUT_SECS: {}", raw))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let config = Self {
            access_token: std::env::var("INSTAGRAM_ACCESS_TOKEN").unwrap_or_default(),
            ig_user_id: std::env::var("INSTAGRAM_BUSINESS_ACCOUNT_ID").unwrap_or_default(),
            base_url: std::env::var("GRAPH_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_version: std::env::var("GRAPH_API_VERSION")
                .unwrap_or_else(|_| DEFAULT_API_VERSION.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            provider,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), GraphError> {
        if self.provider != "graph" {
            return Ok(());
        }
        if self.timeout.is_zero() || self.timeout > Duration::from_secs(MAX_TIMEOUT_SECS) {
            return Err(GraphError::Configuration(format!(
                "GRAPH_API_TIMEOUT_SECS must be between 1 and {}",
                MAX_TIMEOUT_SECS
            )));
        }
        if self.access_token.is_empty() {
            return Err(GraphError::Configuration(
                "INSTAGRAM_ACCESS_TOKEN is required for the graph provider".to_string(),
            ));
        }
        if self.ig_user_id.is_empty() {
            return Err(GraphError::Configuration(
                "INSTAGRAM_BUSINESS_ACCOUNT_ID is required for the graph provider".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outbound calls this backend makes against the Instagram Graph API
#[async_trait::async_trait]
pub trait InstagramService: Send + Sync {
    /// Stage an image post. Nothing is visible until `publish_media`.
    async fn create_media_container(
        &self,
        request: ContainerRequest,
    ) -> Result<MediaContainer, GraphError>;

    /// Make a staged container live
    async fn publish_media(&self, container_id: &str) -> Result<PublishedMedia, GraphError>;

    /// Attach catalog product tags to a live post
    async fn tag_media(&self, media_id: &str, tags: &[ProductTag]) -> Result<(), GraphError>;
}

/// Factory for creating InstagramService implementations
pub struct InstagramServiceFactory;

impl InstagramServiceFactory {
    pub fn create(config: GraphConfig) -> Result<Box<dyn InstagramService>, GraphError> {
        config.validate()?;
        match config.provider.as_str() {
            "graph" => {
                tracing::info!(api_version = %config.api_version, "Creating Graph API client");
                Ok(Box::new(client::GraphClient::new(config)?))
            }
            "mock" => {
                tracing::info!("Creating mock Instagram service");
                Ok(Box::new(mock::MockInstagramService::new()))
            }
            provider => Err(GraphError::Configuration(format!(
                "Unknown graph provider: {}. Supported providers: graph, mock",
                provider
            ))),
        }
    }
}
