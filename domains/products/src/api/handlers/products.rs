//! Product management API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shoppost_auth::AuthUser;
use shoppost_common::{Error, Pagination, Result, ValidatedJson};
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::ProductsState;
use crate::domain::entities::{Product, ProductChanges, ProductStatus};

/// Request for creating a product
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    /// Accepts a JSON number or a decimal string
    pub price: Decimal,

    #[validate(url)]
    pub image_url: String,
}

/// Request for a partial product update
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    /// An empty string clears the description
    #[validate(length(max = 2000))]
    pub description: Option<String>,

    pub price: Option<Decimal>,

    #[validate(url)]
    pub image_url: Option<String>,
}

impl From<UpdateProductRequest> for ProductChanges {
    fn from(req: UpdateProductRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            price: req.price,
            image_url: req.image_url,
        }
    }
}

/// `?published=` filter for the product list
#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    pub published: Option<bool>,
}

/// Product response DTO
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: String,
    pub published: bool,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            published: p.is_published(),
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            image_url: p.image_url,
            status: p.status,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

fn not_found(id: Uuid) -> Error {
    Error::NotFound(format!("Product {} not found", id))
}

/// Create a product
pub async fn create_product(
    AuthUser(ctx): AuthUser,
    State(state): State<ProductsState>,
    ValidatedJson(req): ValidatedJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    let product = Product::new(req.name, req.description, req.price, req.image_url)?;
    let created = state.repos.products.create(&product).await?;

    tracing::info!(product_id = %created.id, admin = %ctx.subject, "Product created");
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// List products, newest first
pub async fn list_products(
    AuthUser(_ctx): AuthUser,
    State(state): State<ProductsState>,
    Query(pagination): Query<Pagination>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<ProductResponse>>> {
    let products = state
        .repos
        .products
        .list(filter.published, pagination.limit(), pagination.offset())
        .await?;

    let responses: Vec<ProductResponse> = products.into_iter().map(Into::into).collect();
    Ok(Json(responses))
}

/// Get a single product by ID
pub async fn get_product(
    AuthUser(_ctx): AuthUser,
    State(state): State<ProductsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductResponse>> {
    let product = state
        .repos
        .products
        .find(id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(product.into()))
}

/// Update a product. Publishing state is not editable.
pub async fn update_product(
    AuthUser(ctx): AuthUser,
    State(state): State<ProductsState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateProductRequest>,
) -> Result<Json<ProductResponse>> {
    let changes = ProductChanges::from(req);
    if changes.is_empty() {
        return Err(Error::Validation("No fields to update".to_string()));
    }

    let mut product = state
        .repos
        .products
        .find(id)
        .await?
        .ok_or_else(|| not_found(id))?;

    product.apply_changes(changes)?;

    let updated = state
        .repos
        .products
        .update(&product)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(product_id = %id, admin = %ctx.subject, "Product updated");
    Ok(Json(updated.into()))
}

/// Delete a product together with its publish history
pub async fn delete_product(
    AuthUser(ctx): AuthUser,
    State(state): State<ProductsState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if !state.repos.products.delete(id).await? {
        return Err(not_found(id));
    }

    tracing::info!(product_id = %id, admin = %ctx.subject, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
