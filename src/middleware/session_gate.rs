/// Session Gate
///
/// Validates the bearer token on every request to a protected scope and
/// injects the token's claims into request extensions for route handlers.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, AUTHORIZATION},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::sync::Arc;

use crate::auth::TokenService;
use crate::clock::Clock;
use crate::error::{AppError, AuthError};

/// Extract the token from `Authorization: Bearer <token>`
///
/// The scheme name is matched case-insensitively. Returns `None` for a
/// missing header, a non-Bearer scheme or an empty token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }

    Some(token.trim()).filter(|token| !token.is_empty())
}

/// Middleware for protecting routes
///
/// Stateless: holds only the token service and a clock. Requests without a
/// valid token never reach the wrapped service.
pub struct SessionGate {
    tokens: Arc<TokenService>,
    clock: Arc<dyn Clock>,
}

impl SessionGate {
    pub fn new(tokens: Arc<TokenService>, clock: Arc<dyn Clock>) -> Self {
        Self { tokens, clock }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionGateService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(SessionGateService {
            service: Rc::new(service),
            tokens: self.tokens.clone(),
            clock: self.clock.clone(),
        }))
    }
}

pub struct SessionGateService<S> {
    service: Rc<S>,
    tokens: Arc<TokenService>,
    clock: Arc<dyn Clock>,
}

impl<S, B> Service<ServiceRequest> for SessionGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let outcome = match bearer_token(req.headers()) {
            None => Err(AuthError::MissingCredentials),
            Some(token) => self.tokens.validate(token, self.clock.now()),
        };

        match outcome {
            Ok(claims) => {
                tracing::debug!(user_id = %claims.sub, path = %req.path(), "Session validated");
                req.extensions_mut().insert(claims);

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await.map(|res| res.map_into_left_body()) })
            }
            Err(e) => {
                tracing::warn!(path = %req.path(), reason = %e, "Rejected unauthenticated request");
                // Rejections are responses so outer middleware still sees them
                let res = req.error_response(AppError::Auth(e)).map_into_right_body();
                Box::pin(async move { Ok(res) })
            }
        }
    }
}
