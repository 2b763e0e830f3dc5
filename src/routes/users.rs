/// User management routes
///
/// Mounted under `/api` behind the session gate, so every handler here sees
/// validated `Claims` in request extensions.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{AuthService, Claims};
use crate::error::{AppError, DatabaseError, ValidationError};
use crate::store::{UserResponse, UserUpdate};
use crate::validators::is_valid_username;

/// Partial update of the authenticated user
#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

fn user_not_found(id: Uuid) -> DatabaseError {
    DatabaseError::NotFound(format!("user {}", id))
}

/// GET /api/me
pub async fn get_current_user(
    claims: web::ReqData<Claims>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id();
    let user = auth
        .store()
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| user_not_found(user_id))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// GET /api/users
pub async fn list_users(auth: web::Data<AuthService>) -> Result<HttpResponse, AppError> {
    let users: Vec<UserResponse> = auth
        .store()
        .list()
        .await?
        .iter()
        .map(UserResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(users))
}

/// GET /api/users/{id}
pub async fn get_user(
    path: web::Path<Uuid>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let user = auth
        .store()
        .find_by_id(id)
        .await?
        .ok_or_else(|| user_not_found(id))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// PUT /api/users
///
/// Change the authenticated user's username and/or password.
///
/// # Errors
/// - 400: empty update, invalid username or weak password
/// - 404: the user no longer exists
/// - 409: username already taken
pub async fn update_user(
    claims: web::ReqData<Claims>,
    form: web::Json<UpdateUserRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id();
    let form = form.into_inner();

    let mut update = UserUpdate::default();
    if let Some(username) = form.username {
        update.username = Some(is_valid_username(&username)?);
    }
    if let Some(password) = form.password {
        update.password_hash = Some(auth.hash_password(&password).await?);
    }
    if update.is_empty() {
        return Err(ValidationError::InvalidFormat(
            "at least one of username or password is required".to_string(),
        )
        .into());
    }

    let user = auth
        .store()
        .update(user_id, update)
        .await?
        .ok_or_else(|| user_not_found(user_id))?;

    tracing::info!(user_id = %user.id, "User updated");
    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    path: web::Path<Uuid>,
    claims: web::ReqData<Claims>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    if !auth.store().delete(id).await? {
        return Err(user_not_found(id).into());
    }

    tracing::info!(user_id = %id, deleted_by = %claims.user_id(), "User deleted");
    Ok(HttpResponse::NoContent().finish())
}
