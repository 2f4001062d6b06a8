//! Transaction helpers for the publish workflow

use crate::domain::entities::{Product, ProductStatus, PublishHistory};
use crate::domain::state::{PublishEvent, PublishStateMachine};
use crate::repository::products::PRODUCT_COLUMNS;
use crate::repository::publish_history::PUBLISH_HISTORY_COLUMNS;
use shoppost_common::{Error, Result};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

/// Record a live post: flip the claimed product to `published` and append
/// its history row in the same transaction.
///
/// Fails with `Conflict` if `claim` no longer holds the product.
pub async fn complete_publish_tx(
    tx: &mut Transaction<'_, Postgres>,
    claim: Uuid,
    history: &PublishHistory,
) -> Result<(Product, PublishHistory)> {
    let next = PublishStateMachine::transition(ProductStatus::Publishing, PublishEvent::Succeed)?;

    let query = format!(
        "UPDATE products \
         SET status = $3, claim_id = NULL, claimed_at = NULL, updated_at = NOW() \
         WHERE id = $1 AND status = 'publishing' AND claim_id = $2 \
         RETURNING {PRODUCT_COLUMNS}"
    );
    let product = sqlx::query_as::<_, Product>(&query)
        .bind(history.product_id)
        .bind(claim)
        .bind(next)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| {
            Error::Conflict(format!(
                "Product {} is no longer being published",
                history.product_id
            ))
        })?;

    let query = format!(
        "INSERT INTO publish_history ({PUBLISH_HISTORY_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING {PUBLISH_HISTORY_COLUMNS}"
    );
    let created = sqlx::query_as::<_, PublishHistory>(&query)
        .bind(history.id)
        .bind(history.product_id)
        .bind(history.published_at)
        .bind(&history.external_post_id)
        .bind(&history.container_id)
        .bind(&history.caption)
        .bind(history.tag_status)
        .bind(&history.tag_error)
        .fetch_one(&mut **tx)
        .await?;

    Ok((product, created))
}
