use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CredentialStore, User, UserUpdate};
use crate::error::DatabaseError;

/// Process-local credential store.
///
/// Uniqueness checks and writes happen under one write guard, so concurrent
/// registrations of the same username cannot both succeed.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn username_taken(users: &HashMap<Uuid, User>, username: &str, except: Option<Uuid>) -> bool {
    users
        .values()
        .any(|u| u.username == username && Some(u.id) != except)
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn insert(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let mut users = self.users.write().await;
        if username_taken(&users, username, None) {
            return Err(DatabaseError::DuplicateUser);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, DatabaseError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn update(&self, id: Uuid, update: UserUpdate) -> Result<Option<User>, DatabaseError> {
        let mut users = self.users.write().await;
        if let Some(username) = &update.username {
            if username_taken(&users, username, Some(id)) {
                return Err(DatabaseError::DuplicateUser);
            }
        }

        let Some(user) = users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(username) = update.username {
            user.username = username;
        }
        if let Some(password_hash) = update.password_hash {
            user.password_hash = password_hash;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.users.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = InMemoryCredentialStore::new();
        let user = store.insert("alice", "$2b$04$hash").await.unwrap();

        let found = store.find_by_username("alice").await.unwrap();
        assert_eq!(found, Some(user.clone()));
        assert_eq!(store.find_by_id(user.id).await.unwrap(), Some(user));
        assert!(store.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let store = InMemoryCredentialStore::new();
        store.insert("alice", "h1").await.unwrap();

        let result = store.insert("alice", "h2").await;
        assert!(matches!(result, Err(DatabaseError::DuplicateUser)));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_fields() {
        let store = InMemoryCredentialStore::new();
        let user = store.insert("alice", "h1").await.unwrap();

        let updated = store
            .update(
                user.id,
                UserUpdate {
                    username: Some("alicia".to_string()),
                    password_hash: Some("h2".to_string()),
                },
            )
            .await
            .unwrap()
            .expect("user should exist");

        assert_eq!(updated.username, "alicia");
        assert_eq!(updated.password_hash, "h2");
        assert_eq!(updated.created_at, user.created_at);
        assert!(store.find_by_username("alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_to_taken_username_conflicts() {
        let store = InMemoryCredentialStore::new();
        let alice = store.insert("alice", "h1").await.unwrap();
        store.insert("bob", "h2").await.unwrap();

        let result = store
            .update(
                alice.id,
                UserUpdate {
                    username: Some("bob".to_string()),
                    password_hash: None,
                },
            )
            .await;
        assert!(matches!(result, Err(DatabaseError::DuplicateUser)));

        // Renaming to one's own name is not a conflict
        let result = store
            .update(
                alice.id,
                UserUpdate {
                    username: Some("alice".to_string()),
                    password_hash: None,
                },
            )
            .await;
        assert!(result.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_user() {
        let store = InMemoryCredentialStore::new();

        assert!(store
            .update(Uuid::new_v4(), UserUpdate::default())
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryCredentialStore::new();
        let user = store.insert("alice", "h1").await.unwrap();

        assert!(store.delete(user.id).await.unwrap());
        assert!(store.find_by_id(user.id).await.unwrap().is_none());
    }

    #[test]
    fn test_debug_redacts_hash() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            password_hash: "$2b$04$secretsecret".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(!format!("{:?}", user).contains("secretsecret"));
    }
}
