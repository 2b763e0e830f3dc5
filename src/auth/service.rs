/// Register, login and refresh flows
///
/// Orchestrates the credential store, the password hasher and the token
/// service. bcrypt work runs on the blocking pool.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::auth::jwt::TokenService;
use crate::auth::password::{validate_password_strength, PasswordHasher};
use crate::error::{AppError, AuthError};
use crate::store::{CredentialStore, User};
use crate::validators::is_valid_username;

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    tokens: Arc<TokenService>,
    hasher: PasswordHasher,
}

async fn run_blocking<F, T>(task: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| AppError::Internal(format!("Blocking task failed: {}", e)))?
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        tokens: Arc<TokenService>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            store,
            tokens,
            hasher,
        }
    }

    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    /// Apply the password policy and hash
    ///
    /// # Errors
    /// - `Validation`: password does not meet the policy
    /// - `Hashing`: bcrypt failure
    pub async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        validate_password_strength(password)?;

        let hasher = self.hasher.clone();
        let password = password.to_string();
        run_blocking(move || hasher.hash(&password)).await
    }

    /// Create a user
    ///
    /// # Errors
    /// - `Validation`: bad username or weak password
    /// - `Database(DuplicateUser)`: username already taken
    /// - `Hashing`: bcrypt failure
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AppError> {
        let username = is_valid_username(username)?;
        let password_hash = self.hash_password(password).await?;

        let user = self.store.insert(&username, &password_hash).await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Check credentials and issue a session token
    ///
    /// Unknown usernames and wrong passwords both yield
    /// `AuthError::InvalidCredentials`, after one bcrypt verification each.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let user = self.store.find_by_username(username.trim()).await?;

        let hasher = self.hasher.clone();
        let password = password.to_string();
        let authenticated = match user {
            None => {
                run_blocking(move || Ok(hasher.verify_dummy(&password))).await?;
                None
            }
            Some(user) => {
                let password_hash = user.password_hash.clone();
                let verified = run_blocking(move || hasher.verify(&password, &password_hash)).await?;
                verified.then_some(user)
            }
        };

        let user = authenticated.ok_or(AuthError::InvalidCredentials)?;
        let token = self.tokens.issue(user.id, now)?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(token)
    }

    /// Exchange a valid token for a fresh one with a new expiry
    ///
    /// Trusts the presented token alone; the store is not consulted.
    ///
    /// # Errors
    /// The validation error, unchanged
    pub fn refresh(&self, token: &str, now: DateTime<Utc>) -> Result<String, AppError> {
        let claims = self.tokens.validate(token, now)?;
        let token = self.tokens.issue(claims.sub, now)?;

        tracing::info!(user_id = %claims.sub, "Token refreshed");
        Ok(token)
    }
}
