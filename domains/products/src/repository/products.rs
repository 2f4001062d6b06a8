//! Product repository

use crate::domain::entities::{Product, ProductStatus};
use shoppost_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// All columns in the products table, used for SELECT and RETURNING clauses.
pub(crate) const PRODUCT_COLUMNS: &str = "\
    id, name, description, price, image_url, \
    status, created_at, updated_at";

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find product by ID
    pub async fn find(&self, id: Uuid) -> Result<Option<Product>> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// List products, newest first, optionally filtered on the published flag
    pub async fn list(
        &self,
        published: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>> {
        let query = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE ($1::bool IS NULL OR (status = 'published') = $1) \
             ORDER BY created_at DESC, id LIMIT $2 OFFSET $3"
        );
        let products = sqlx::query_as::<_, Product>(&query)
            .bind(published)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Create a new product
    pub async fn create(&self, product: &Product) -> Result<Product> {
        let query = format!(
            "INSERT INTO products ({PRODUCT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Product>(&query)
            .bind(product.id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(&product.image_url)
            .bind(product.status)
            .bind(product.created_at)
            .bind(product.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    /// Persist edited fields. The publish status is never written here.
    pub async fn update(&self, product: &Product) -> Result<Option<Product>> {
        let query = format!(
            "UPDATE products \
             SET name = $2, description = $3, price = $4, image_url = $5, updated_at = $6 \
             WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Product>(&query)
            .bind(product.id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(&product.image_url)
            .bind(product.updated_at)
            .fetch_optional(&self.pool)
            .await?;

        Ok(updated)
    }

    /// Delete a product and, by cascade, its publish history
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Atomically move a product into `publishing` under the token `claim`.
    ///
    /// Succeeds from `unpublished`, or from a `publishing` claim that has not
    /// been confirmed for `stale_after_secs`. Returns `None` when another request
    /// holds the claim, the product is already published, or it does not exist.
    pub async fn claim_for_publish(
        &self,
        id: Uuid,
        claim: Uuid,
        stale_after_secs: f64,
    ) -> Result<Option<Product>> {
        let query = format!(
            "UPDATE products \
             SET status = 'publishing', claim_id = $2, claimed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND (status = 'unpublished' \
                OR (status = 'publishing' \
                    AND (claimed_at IS NULL OR claimed_at < NOW() - make_interval(secs => $3)))) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let claimed = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(claim)
            .bind(stale_after_secs)
            .fetch_optional(&self.pool)
            .await?;

        Ok(claimed)
    }

    /// Confirm that `claim` still holds the product and restart its stale
    /// clock. Returns `false` once another request has taken the claim over.
    pub async fn renew_claim(&self, id: Uuid, claim: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE products SET claimed_at = NOW() \
             WHERE id = $1 AND status = 'publishing' AND claim_id = $2",
        )
        .bind(id)
        .bind(claim)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Give a `publishing` claim back after a failed publish. Only the holder
    /// of `claim` can release it.
    pub async fn release_claim(&self, id: Uuid, claim: Uuid, to: ProductStatus) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE products \
             SET status = $3, claim_id = NULL, claimed_at = NULL, updated_at = NOW() \
             WHERE id = $1 AND status = 'publishing' AND claim_id = $2",
        )
        .bind(id)
        .bind(claim)
        .bind(to)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
