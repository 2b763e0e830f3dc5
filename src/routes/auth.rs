/// Authentication Routes
///
/// Handles user registration, login and token refresh.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::AuthService;
use crate::clock::Clock;
use crate::error::{AppError, AuthError};
use crate::middleware::bearer_token;
use crate::store::UserResponse;

/// Registration and login request body
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Session token response
#[derive(Serialize, Deserialize, Debug)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

impl TokenResponse {
    fn bearer(access_token: String, auth: &AuthService) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: auth.tokens().ttl().num_seconds(),
        }
    }
}

/// POST /auth/register
///
/// Create a user and return its public view. No token is issued; the client
/// logs in afterwards.
///
/// # Errors
/// - 400: invalid username or weak password
/// - 409: username already registered
/// - 500: internal error
pub async fn register(
    form: web::Json<CredentialsRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let user = auth.register(&form.username, &form.password).await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// POST /auth/login
///
/// # Errors
/// - 401: invalid credentials (same response for unknown user and wrong password)
/// - 500: internal error
pub async fn login(
    form: web::Json<CredentialsRequest>,
    auth: web::Data<AuthService>,
    clock: web::Data<dyn Clock>,
) -> Result<HttpResponse, AppError> {
    let token = auth.login(&form.username, &form.password, clock.now()).await?;

    Ok(HttpResponse::Ok().json(TokenResponse::bearer(token, &auth)))
}

/// GET /auth/refresh
///
/// Exchange the bearer token for a new one with a fresh expiry.
///
/// # Errors
/// - 401: missing, malformed, forged or expired token
pub async fn refresh(
    req: HttpRequest,
    auth: web::Data<AuthService>,
    clock: web::Data<dyn Clock>,
) -> Result<HttpResponse, AppError> {
    let presented = bearer_token(req.headers()).ok_or(AuthError::MissingCredentials)?;
    let token = auth.refresh(presented, clock.now())?;

    Ok(HttpResponse::Ok().json(TokenResponse::bearer(token, &auth)))
}
