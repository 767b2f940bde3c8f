use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, instrument};

use super::types::Claims;
use crate::shared::AppError;

/// Signing configuration for bearer tokens: process-wide secret and ttl,
/// loaded once at boot and injected where needed. No runtime rotation.
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub ttl: Duration,
}

impl TokenConfig {
    pub fn new(secret: String, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    /// Reads `JWT_SECRET_KEY` and `TOKEN_TTL_MINUTES` (default 120) from the
    /// environment.
    pub fn from_env() -> Self {
        let ttl_minutes = std::env::var("TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(120);

        Self {
            secret: std::env::var("JWT_SECRET_KEY")
                .unwrap_or_else(|_| "change-this-secret-in-production".to_string()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    /// Signs a new bearer token bound to the given user id.
    ///
    /// Pure computation; the session set is not touched here.
    #[instrument(skip(self, user_id))]
    pub fn issue(&self, user_id: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
        };

        debug!(exp = claims.exp, "Issuing signed token");

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode token");
            AppError::Internal
        })
    }

    /// Checks signature validity and ttl expiry, returning the decoded claims.
    /// Any failure (bad signature, expired, malformed payload) is AccessDenied.
    #[instrument(skip(self, token))]
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| {
            debug!(sub = %data.claims.sub, exp = data.claims.exp, "Token verified");
            data.claims
        })
        .map_err(|e| {
            debug!(error = %e, "Token verification failed");
            AppError::AccessDenied("Access denied".to_string())
        })
    }
}
