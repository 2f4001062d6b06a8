//! JWT validation and bearer token extraction

use axum::http::HeaderValue;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::claims::AdminClaims;
use crate::config::AuthConfig;
use crate::error::AuthError;

/// Validate an HS256 token against the configured secret, issuer and audience
pub(crate) fn validate_jwt_token(token: &str, config: &AuthConfig) -> Result<AdminClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);

    match &config.audience {
        Some(aud) => validation.set_audience(&[aud]),
        None => validation.validate_aud = false,
    }

    if let Some(iss) = &config.issuer {
        validation.set_issuer(&[iss]);
    }

    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_ref());

    let token_data = decode::<AdminClaims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "JWT validation failed");
        AuthError::InvalidToken
    })?;

    Ok(token_data.claims)
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub(crate) fn extract_bearer_token(header: &HeaderValue) -> Result<&str, AuthError> {
    let header_str = header
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorizationFormat)?;

    match header_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::InvalidAuthorizationFormat),
    }
}
