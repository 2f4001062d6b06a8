//! JWT claims types

use serde::{Deserialize, Serialize};

/// Claims carried by an admin UI bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Subject (admin user identifier)
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub iat: u64,
    pub exp: u64,
}
