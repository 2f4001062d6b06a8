//! Authentication errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Reasons a request fails authentication
#[derive(Debug)]
pub enum AuthError {
    MissingAuthorization,
    InvalidAuthorizationFormat,
    InvalidToken,
    InvalidSubject,
}

impl AuthError {
    fn parts(&self) -> (&'static str, &'static str) {
        match self {
            AuthError::MissingAuthorization => {
                ("MISSING_AUTHORIZATION", "Authorization header required")
            }
            AuthError::InvalidAuthorizationFormat => (
                "INVALID_AUTHORIZATION",
                "Authorization header must be 'Bearer <token>'",
            ),
            AuthError::InvalidToken => ("INVALID_TOKEN", "Invalid or expired token"),
            AuthError::InvalidSubject => ("INVALID_TOKEN", "Token has no subject"),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
