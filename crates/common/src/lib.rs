//! Shared utilities, configuration, and error handling for Shoppost
//!
//! - Configuration loaded from the environment
//! - The API error type and its JSON rendering
//! - Request extractors shared by the domain crates

pub mod config;
pub mod error;
pub mod extractors;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use extractors::{Pagination, ValidatedJson, ValidatedJsonOrDefault};
pub use state::StateError;
