//! Instagram Graph API HTTP client
//!
//! Calls, relative to `{base_url}/{api_version}`:
//! - `POST /{ig_user_id}/media` to create a container
//! - `POST /{ig_user_id}/media_publish` to publish it
//! - `POST /{media_id}/product_tags` to tag the live post

use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    ContainerRequest, GraphConfig, GraphError, InstagramService, MediaContainer, ProductTag,
    PublishedMedia,
};

/// Graph error codes that signal throttling rather than a bad request
const THROTTLING_CODES: &[i64] = &[4, 17, 32, 613];

#[derive(Debug, Serialize)]
struct CreateContainerBody<'a> {
    image_url: &'a str,
    caption: &'a str,
}

#[derive(Debug, Serialize)]
struct PublishBody<'a> {
    creation_id: &'a str,
}

#[derive(Debug, Serialize)]
struct ProductTagsBody {
    /// The API expects the tag list as a JSON-encoded string
    updated_tags: String,
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SuccessResponse {
    success: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    code: Option<i64>,
    fbtrace_id: Option<String>,
}

/// reqwest-backed Graph API client for one business account
pub struct GraphClient {
    http: Client,
    api_url: String,
    ig_user_id: String,
    access_token: String,
}

impl GraphClient {
    /// Every request is bounded by `config.timeout`
    pub fn new(config: GraphConfig) -> Result<Self, GraphError> {
        let api_url = format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            config.api_version.trim_matches('/')
        );

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GraphError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_url,
            ig_user_id: config.ig_user_id,
            access_token: config.access_token,
        })
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, GraphError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.api_url, path);

        tracing::debug!(path = %path, "Sending Graph API request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| GraphError::Request(format!("HTTP request failed: {}", e)))?;

        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GraphError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GraphError::RateLimit);
    }

    if !status.is_success() {
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());

        return Err(match serde_json::from_str::<ErrorResponse>(&error_body) {
            Ok(ErrorResponse { error }) => {
                tracing::debug!(
                    code = ?error.code,
                    fbtrace_id = ?error.fbtrace_id,
                    "Graph API returned an error"
                );
                match error.code {
                    Some(code) if THROTTLING_CODES.contains(&code) => GraphError::RateLimit,
                    code => GraphError::Api {
                        status: status.as_u16(),
                        code,
                        message: error.message,
                    },
                }
            }
            Err(_) => GraphError::Api {
                status: status.as_u16(),
                code: None,
                message: error_body,
            },
        });
    }

    response
        .json()
        .await
        .map_err(|e| GraphError::Response(format!("Failed to parse response: {}", e)))
}

#[async_trait::async_trait]
impl InstagramService for GraphClient {
    async fn create_media_container(
        &self,
        request: ContainerRequest,
    ) -> Result<MediaContainer, GraphError> {
        let path = format!("{}/media", self.ig_user_id);
        let body = CreateContainerBody {
            image_url: &request.image_url,
            caption: &request.caption,
        };

        let IdResponse { id } = self.post(&path, &body).await?;
        tracing::info!(container_id = %id, "Media container created");
        Ok(MediaContainer { id })
    }

    async fn publish_media(&self, container_id: &str) -> Result<PublishedMedia, GraphError> {
        let path = format!("{}/media_publish", self.ig_user_id);
        let body = PublishBody {
            creation_id: container_id,
        };

        let IdResponse { id } = self.post(&path, &body).await?;
        tracing::info!(container_id = %container_id, media_id = %id, "Media published");
        Ok(PublishedMedia { id })
    }

    async fn tag_media(&self, media_id: &str, tags: &[ProductTag]) -> Result<(), GraphError> {
        let path = format!("{}/product_tags", media_id);
        let body = ProductTagsBody {
            updated_tags: serde_json::to_string(tags)
                .map_err(|e| GraphError::Request(format!("Failed to encode tags: {}", e)))?,
        };

        let SuccessResponse { success } = self.post(&path, &body).await?;
        if !success {
            return Err(GraphError::Response(
                "Graph API did not confirm product tags".to_string(),
            ));
        }

        tracing::info!(media_id = %media_id, count = tags.len(), "Product tags applied");
        Ok(())
    }
}
