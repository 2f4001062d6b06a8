//! Products domain state and auth backend integration

use crate::ProductsRepositories;
use axum::extract::FromRef;
use shoppost_auth::AuthBackend;
use shoppost_graph::InstagramService;
use std::sync::Arc;

/// Application state for the Products domain
#[derive(Clone)]
pub struct ProductsState {
    pub repos: ProductsRepositories,
    pub auth: AuthBackend,
    pub instagram: Arc<dyn InstagramService>,
}

impl FromRef<ProductsState> for AuthBackend {
    fn from_ref(state: &ProductsState) -> Self {
        state.auth.clone()
    }
}
