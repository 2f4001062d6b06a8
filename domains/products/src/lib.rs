//! Products domain: catalog entries, Instagram publishing, publish history

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::caption::{caption_for, MAX_CAPTION_CHARS};
pub use domain::entities::{Product, ProductChanges, ProductStatus, PublishHistory, TagStatus};
pub use domain::state::{PublishEvent, PublishStateMachine};

// Re-export repository types
pub use repository::{ProductRepository, ProductsRepositories, PublishHistoryRepository};

// Re-export API types
pub use api::routes;
pub use api::ProductsState;
