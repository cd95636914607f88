//! JWT claims structure for intake admin access.

use serde::{Deserialize, Serialize};

/// Role allowed to read stored inquiries.
pub const ADMIN_ROLE: &str = "admin";

/// JWT claims carried by bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// JWT ID (unique per token).
    pub jti: String,
    /// Subject (operator name or email).
    pub sub: String,
    pub role: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}
