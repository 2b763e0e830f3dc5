/// Session token claims
///
/// Fixed-shape payload of a session token. Field declaration order is the
/// serialization order, so the signed bytes are stable for a given value.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token class carried in the `kind` claim
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Presented on protected routes and on refresh
    Access,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Unique token id; two tokens issued in the same second still differ
    pub jti: Uuid,
    pub kind: TokenKind,
}

impl Claims {
    /// Build access claims valid from `now` for `ttl`
    pub fn new(user_id: Uuid, now: DateTime<Utc>, ttl: Duration, issuer: &str) -> Self {
        let iat = now.timestamp();
        Self {
            sub: user_id,
            iat,
            exp: iat + ttl.num_seconds(),
            iss: issuer.to_string(),
            jti: Uuid::new_v4(),
            kind: TokenKind::Access,
        }
    }

    /// Subject of the token
    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Expired when `exp` is at or before `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}
