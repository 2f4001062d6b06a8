//! Request extractors shared by the domain routers

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use validator::Validate;

use crate::Error;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 100;

/// `offset` / `limit` query parameters for list endpoints
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl Pagination {
    /// Offset, never negative
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// Limit, defaulting to 50 and clamped to `1..=100`
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

/// JSON body extractor that also runs `validator` rules.
///
/// Both malformed bodies and rule violations are rejected with
/// `Error::Validation` (400), so handlers only ever see valid input.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| Error::Validation(rejection.body_text()))?;

        value
            .validate()
            .map_err(|e| Error::Validation(format!("Validation failed: {}", e)))?;

        Ok(ValidatedJson(value))
    }
}

/// Like `ValidatedJson`, but a missing or blank body yields `T::default()`.
///
/// For endpoints whose every field is optional, so clients may POST nothing.
#[derive(Debug)]
pub struct ValidatedJsonOrDefault<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJsonOrDefault<T>
where
    T: DeserializeOwned + Validate + Default,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| Error::Validation(rejection.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(ValidatedJsonOrDefault(T::default()));
        }

        let Json(value) = Json::<T>::from_bytes(&bytes)
            .map_err(|rejection| Error::Validation(rejection.body_text()))?;

        value
            .validate()
            .map_err(|e| Error::Validation(format!("Validation failed: {}", e)))?;

        Ok(ValidatedJsonOrDefault(value))
    }
}
