/// Session Token Issuance and Validation
///
/// HS256-signed JWTs. Keys, TTL and issuer are fixed when the service is
/// built; the caller supplies `now` for every operation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::configuration::{AuthSettings, SigningSecret};
use crate::error::{AppError, AuthError, ConfigError};

/// Issues and validates session tokens
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    issuer: String,
}

impl TokenService {
    /// # Errors
    /// Returns `ConfigError::InvalidValue` if `ttl` is shorter than one second
    pub fn new(
        secret: &SigningSecret,
        ttl: Duration,
        issuer: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        // Claims carry whole seconds, so anything shorter would give exp == iat
        if ttl.num_seconds() < 1 {
            return Err(ConfigError::InvalidValue(format!(
                "token ttl must be at least 1s, got {}ms",
                ttl.num_milliseconds()
            )));
        }
        let issuer = issuer.into();

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the caller's clock, not the wall clock
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.expose_secret()),
            decoding_key: DecodingKey::from_secret(secret.expose_secret()),
            validation,
            ttl,
            issuer,
        })
    }

    /// Build from configuration; a missing secret is an error
    pub fn from_settings(settings: &AuthSettings) -> Result<Self, ConfigError> {
        let secret = settings.signing_secret()?;
        let ttl = Duration::try_seconds(settings.token_ttl_seconds).ok_or_else(|| {
            ConfigError::InvalidValue(format!(
                "token ttl out of range: {}s",
                settings.token_ttl_seconds
            ))
        })?;
        Self::new(&secret, ttl, settings.issuer.clone())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `user_id` valid from `now` until `now + ttl`
    ///
    /// # Errors
    /// Returns `AppError::Internal` if claim serialization fails
    pub fn issue(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<String, AppError> {
        let claims = Claims::new(user_id, now, self.ttl, &self.issuer);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Verify signature and expiry and return the claims
    ///
    /// # Errors
    /// - `MalformedToken`: not a well-formed token for this issuer
    /// - `InvalidSignature`: signature does not match the encoded content
    /// - `TokenExpired`: `exp <= now`
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let err = match e.kind() {
                    ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::MalformedToken,
                };
                tracing::debug!(reason = %e, "Token rejected: {}", err);
                err
            })?;

        // `kind` is checked by deserialization: unknown kinds fail as malformed
        if claims.is_expired_at(now) {
            tracing::debug!(user_id = %claims.sub, exp = claims.exp, "Token rejected: expired");
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}
