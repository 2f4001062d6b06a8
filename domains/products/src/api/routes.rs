//! Route definitions for Products domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{products, publish};
use super::middleware::ProductsState;

/// Create product CRUD routes
fn product_routes() -> Router<ProductsState> {
    Router::new()
        .route(
            "/v1/products",
            post(products::create_product).get(products::list_products),
        )
        .route(
            "/v1/products/{id}",
            get(products::get_product)
                .patch(products::update_product)
                .delete(products::delete_product),
        )
}

/// Create publishing routes
fn publish_routes() -> Router<ProductsState> {
    Router::new()
        .route("/v1/products/{id}/publish", post(publish::publish_product))
        .route(
            "/v1/products/{id}/publish-history",
            get(publish::list_publish_history),
        )
}

/// Create all Products domain API routes
pub fn routes() -> Router<ProductsState> {
    Router::new()
        .merge(product_routes())
        .merge(publish_routes())
}
