//! Authentication backend shared through axum state

use crate::config::AuthConfig;
use crate::context::AuthContext;
use crate::error::AuthError;

/// Verifies bearer tokens for the admin API.
///
/// Domain states expose this via `FromRef`:
/// ```ignore
/// impl FromRef<MyDomainState> for AuthBackend {
///     fn from_ref(state: &MyDomainState) -> Self {
///         state.auth.clone()
///     }
/// }
/// ```
#[derive(Clone, Debug)]
pub struct AuthBackend {
    config: AuthConfig,
}

impl AuthBackend {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Validate a raw bearer token and build the caller's context
    pub(crate) fn authenticate_jwt(&self, token: &str) -> Result<AuthContext, AuthError> {
        let claims = crate::jwt::validate_jwt_token(token, &self.config)?;

        if claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidSubject);
        }

        Ok(AuthContext::from(claims))
    }
}
