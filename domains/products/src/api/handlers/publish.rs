//! Instagram publishing API handlers
//!
//! Publishing runs three Graph API calls in sequence: create a media
//! container, publish it, then optionally tag the live post. A product is
//! claimed (`publishing`) under a per-request token before the first call so
//! that concurrent requests cannot post it twice. A claim older than
//! `STALE_CLAIM_SECS` may be taken over, so the holder re-confirms it right
//! before the irreversible publish step. Graph calls are bounded by the client
//! timeout, which is far shorter than the stale age.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shoppost_auth::AuthUser;
use shoppost_common::{Error, Pagination, Result, ValidatedJsonOrDefault};
use shoppost_graph::{ContainerRequest, GraphError, ProductTag};
use uuid::Uuid;
use validator::Validate;

use crate::api::handlers::products::ProductResponse;
use crate::api::middleware::ProductsState;
use crate::domain::caption::{caption_for, truncate_caption};
use crate::domain::entities::{ProductStatus, PublishHistory, TagStatus};
use crate::domain::state::{PublishEvent, PublishStateMachine};
use crate::repository::complete_publish_tx;

/// A `publishing` claim older than this is assumed abandoned
pub const STALE_CLAIM_SECS: f64 = 300.0;

/// Default tag position: the centre of the image
const DEFAULT_TAG_POSITION: f64 = 0.5;

/// Request for publishing a product. Every field is optional.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PublishRequest {
    /// Replaces the generated caption
    #[validate(length(min = 1, max = 2200))]
    pub caption: Option<String>,

    /// Catalog product to tag on the post
    #[validate(length(min = 1, max = 100))]
    pub catalog_product_id: Option<String>,

    #[validate(range(min = 0.0, max = 1.0))]
    pub tag_x: Option<f64>,

    #[validate(range(min = 0.0, max = 1.0))]
    pub tag_y: Option<f64>,
}

impl PublishRequest {
    /// Tags to attach after publishing, if any were requested
    fn tags(&self) -> Result<Vec<ProductTag>> {
        match &self.catalog_product_id {
            Some(catalog_product_id) => Ok(vec![ProductTag {
                product_id: catalog_product_id.clone(),
                x: self.tag_x.unwrap_or(DEFAULT_TAG_POSITION),
                y: self.tag_y.unwrap_or(DEFAULT_TAG_POSITION),
            }]),
            None if self.tag_x.is_some() || self.tag_y.is_some() => Err(Error::Validation(
                "tag_x and tag_y require catalog_product_id".to_string(),
            )),
            None => Ok(Vec::new()),
        }
    }
}

/// Publish history response DTO
#[derive(Debug, Serialize)]
pub struct PublishHistoryResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub published_at: DateTime<Utc>,
    pub external_post_id: Option<String>,
    pub container_id: Option<String>,
    pub caption: String,
    pub tag_status: TagStatus,
    pub tag_error: Option<String>,
}

impl From<PublishHistory> for PublishHistoryResponse {
    fn from(h: PublishHistory) -> Self {
        Self {
            id: h.id,
            product_id: h.product_id,
            published_at: h.published_at,
            external_post_id: h.external_post_id,
            container_id: h.container_id,
            caption: h.caption,
            tag_status: h.tag_status,
            tag_error: h.tag_error,
        }
    }
}

/// Result of a successful publish
#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub product: ProductResponse,
    pub history: PublishHistoryResponse,
}

fn upstream(step: &str, err: GraphError) -> Error {
    Error::Upstream(format!("Failed to {}: {}", step, err))
}

/// Explain why a product could not be claimed
fn claim_conflict(id: Uuid, status: ProductStatus) -> Error {
    match PublishStateMachine::transition(status, PublishEvent::Begin) {
        Err(_) if status == ProductStatus::Published => {
            Error::Conflict(format!("Product {} is already published", id))
        }
        Err(_) => Error::Conflict(format!("Product {} is already being published", id)),
        // The claim raced with a concurrent release; the caller may retry
        Ok(_) => Error::Conflict(format!("Product {} changed state, try again", id)),
    }
}

fn claim_lost(id: Uuid) -> Error {
    Error::Conflict(format!(
        "Product {} publish claim was taken over by another request",
        id
    ))
}

/// Release a claim after a Graph failure. Nothing is live, so the product
/// goes back to `unpublished`.
async fn release_claim(state: &ProductsState, id: Uuid, claim: Uuid) {
    let target = match PublishStateMachine::transition(ProductStatus::Publishing, PublishEvent::Abort)
    {
        Ok(target) => target,
        Err(e) => {
            tracing::error!(product_id = %id, error = %e, "Cannot release publish claim");
            return;
        }
    };

    match state.repos.products.release_claim(id, claim, target).await {
        Ok(true) => tracing::debug!(product_id = %id, "Publish claim released"),
        Ok(false) => tracing::warn!(product_id = %id, "Publish claim was already gone"),
        Err(e) => {
            tracing::error!(product_id = %id, error = %e, "Failed to release publish claim")
        }
    }
}

/// Publish a product to Instagram
pub async fn publish_product(
    AuthUser(ctx): AuthUser,
    State(state): State<ProductsState>,
    Path(id): Path<Uuid>,
    ValidatedJsonOrDefault(req): ValidatedJsonOrDefault<PublishRequest>,
) -> Result<(StatusCode, Json<PublishResponse>)> {
    let tags = req.tags()?;
    let claim = Uuid::new_v4();

    let product = match state
        .repos
        .products
        .claim_for_publish(id, claim, STALE_CLAIM_SECS)
        .await?
    {
        Some(product) => product,
        None => {
            let current = state
                .repos
                .products
                .find(id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("Product {} not found", id)))?;
            return Err(claim_conflict(id, current.status));
        }
    };

    tracing::info!(
        product_id = %id,
        claim = %claim,
        admin = %ctx.subject,
        "Publishing product"
    );

    let caption = match req.caption {
        Some(caption) => truncate_caption(&caption),
        None => caption_for(&product),
    };

    let container = match state
        .instagram
        .create_media_container(ContainerRequest {
            image_url: product.image_url.clone(),
            caption: caption.clone(),
        })
        .await
    {
        Ok(container) => container,
        Err(e) => {
            release_claim(&state, id, claim).await;
            return Err(upstream("create media container", e));
        }
    };

    // Last point at which backing out leaves nothing live
    if !state.repos.products.renew_claim(id, claim).await? {
        tracing::warn!(
            product_id = %id,
            container_id = %container.id,
            "Publish claim was taken over; abandoning container"
        );
        return Err(claim_lost(id));
    }

    let media = match state.instagram.publish_media(&container.id).await {
        Ok(media) => media,
        Err(e) => {
            release_claim(&state, id, claim).await;
            return Err(upstream("publish media container", e));
        }
    };

    tracing::info!(product_id = %id, media_id = %media.id, "Post is live");

    let (tag_status, tag_error) = if tags.is_empty() {
        (TagStatus::Skipped, None)
    } else {
        match state.instagram.tag_media(&media.id, &tags).await {
            Ok(()) => (TagStatus::Tagged, None),
            Err(e) => {
                tracing::warn!(
                    product_id = %id,
                    media_id = %media.id,
                    error = %e,
                    "Product tagging failed; post stays live"
                );
                (TagStatus::Failed, Some(e.to_string()))
            }
        }
    };

    let history = PublishHistory::new(
        id,
        container.id,
        media.id.clone(),
        caption,
        tag_status,
        tag_error,
    );

    let recorded = async {
        let mut tx = state.repos.begin().await?;
        let recorded = complete_publish_tx(&mut tx, claim, &history).await?;
        tx.commit().await?;
        Ok::<_, Error>(recorded)
    }
    .await;

    let (product, history) = recorded.map_err(|e| {
        tracing::error!(
            product_id = %id,
            media_id = %media.id,
            error = %e,
            "Post is live but could not be recorded"
        );
        e
    })?;

    Ok((
        StatusCode::CREATED,
        Json(PublishResponse {
            product: product.into(),
            history: history.into(),
        }),
    ))
}

/// List the posts made for a product, newest first
pub async fn list_publish_history(
    AuthUser(_ctx): AuthUser,
    State(state): State<ProductsState>,
    Path(id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<PublishHistoryResponse>>> {
    if state.repos.products.find(id).await?.is_none() {
        return Err(Error::NotFound(format!("Product {} not found", id)));
    }

    let history = state
        .repos
        .publish_history
        .list_by_product(id, pagination.limit(), pagination.offset())
        .await?;

    let responses: Vec<PublishHistoryResponse> = history.into_iter().map(Into::into).collect();
    Ok(Json(responses))
}
