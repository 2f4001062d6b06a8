//! Publish history repository

use crate::domain::entities::PublishHistory;
use shoppost_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

pub(crate) const PUBLISH_HISTORY_COLUMNS: &str = "\
    id, product_id, published_at, external_post_id, container_id, \
    caption, tag_status, tag_error";

#[derive(Clone)]
pub struct PublishHistoryRepository {
    pool: PgPool,
}

impl PublishHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List the posts made for a product, newest first
    pub async fn list_by_product(
        &self,
        product_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PublishHistory>> {
        let query = format!(
            "SELECT {PUBLISH_HISTORY_COLUMNS} FROM publish_history \
             WHERE product_id = $1 ORDER BY published_at DESC, id LIMIT $2 OFFSET $3"
        );
        let history = sqlx::query_as::<_, PublishHistory>(&query)
            .bind(product_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(history)
    }
}
