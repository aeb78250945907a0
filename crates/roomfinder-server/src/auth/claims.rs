//! JWT claims carried by the session cookie.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// JWT ID (unique per sign-in).
    pub jti: String,
    /// Subject (username).
    pub sub: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

impl Claims {
    pub fn username(&self) -> &str {
        &self.sub
    }
}
