use actix_web::HttpResponse;

/// GET /
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Hello, you've reached the authentication server. Please leave a message after the beep."
    }))
}

/// GET /health_check
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().finish()
}
