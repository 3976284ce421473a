//! Authentication types for JWT bearer credentials.
//!
//! Token issuance itself lives outside this service; these types only
//! describe the verified principal a valid token resolves to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (principal ID).
    pub sub: Uuid,
    /// Principal display name.
    pub name: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a principal.
    #[must_use]
    pub fn new(principal_id: Uuid, name: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: principal_id,
            name: name.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the principal ID from claims.
    #[must_use]
    pub const fn principal_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the principal display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.name
    }
}
