//! Credential store
//!
//! Persistence boundary for user records. The auth flow only needs
//! `find_by_username` and `insert`; the remaining operations back the user
//! management routes.

mod memory;
mod postgres;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::DatabaseError;

pub use memory::InMemoryCredentialStore;
pub use postgres::PostgresCredentialStore;

/// A stored user. Never serialized directly: responses go through
/// [`UserResponse`].
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Public view of a user
#[derive(Debug, Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

/// Fields to change on an existing user; `None` leaves a field untouched.
/// `password_hash` is already hashed.
#[derive(Debug, Default, Clone)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub password_hash: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password_hash.is_none()
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    /// Create a user. A taken username is `DatabaseError::DuplicateUser`.
    async fn insert(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    /// All users ordered by creation time
    async fn list(&self) -> Result<Vec<User>, DatabaseError>;

    /// Returns `None` if no user has this id
    async fn update(&self, id: Uuid, update: UserUpdate) -> Result<Option<User>, DatabaseError>;

    /// Returns whether a user was removed
    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;
}
