//! Context for an authenticated caller

use crate::claims::AdminClaims;

/// The authenticated admin behind a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub subject: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl From<AdminClaims> for AuthContext {
    fn from(claims: AdminClaims) -> Self {
        Self {
            subject: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}
