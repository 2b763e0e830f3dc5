use actix_web::dev::Server;
use actix_web::error::{JsonPayloadError, PathError};
use actix_web::{web, App, HttpRequest, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::AuthService;
use crate::clock::Clock;
use crate::error::{AppError, ValidationError};
use crate::middleware::{RequestLogger, SessionGate};
use crate::routes::{
    delete_user, get_current_user, get_user, health_check, index, list_users, login, refresh,
    register, update_user,
};

/// Shared, read-only state handed to every worker
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub clock: Arc<dyn Clock>,
}

// Extractor failures get the standard error body; the parser's detail stays in the log
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(reason = %err, "Rejected request body");
    AppError::Validation(ValidationError::InvalidFormat("Invalid request body".to_string())).into()
}

fn path_error(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(reason = %err, "Rejected path parameter");
    AppError::Validation(ValidationError::InvalidFormat("Invalid path parameter".to_string()))
        .into()
}

pub fn run(listener: TcpListener, state: AppState) -> Result<Server, std::io::Error> {
    let auth = web::Data::from(state.auth.clone());
    let clock: web::Data<dyn Clock> = web::Data::from(state.clock.clone());
    let tokens = state.auth.tokens().clone();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            .app_data(auth.clone())
            .app_data(clock.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .app_data(web::PathConfig::default().error_handler(path_error))
            // Public routes
            .route("/", web::get().to(index))
            .route("/health_check", web::get().to(health_check))
            .route("/auth/register", web::post().to(register))
            .route("/auth/login", web::post().to(login))
            .route("/auth/refresh", web::get().to(refresh))
            // Protected routes
            .service(
                web::scope("/api")
                    .wrap(SessionGate::new(tokens.clone(), state.clock.clone()))
                    .route("/me", web::get().to(get_current_user))
                    .route("/users", web::get().to(list_users))
                    .route("/users", web::put().to(update_user))
                    .route("/users/{id}", web::get().to(get_user))
                    .route("/users/{id}", web::delete().to(delete_user)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
