use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::{prune_session_set, SessionToken},
    password::PasswordHasher,
    token::TokenConfig,
    types::{Claims, LoginRequest, LoginResponse, RegisterRequest},
};
use crate::shared::AppError;
use crate::user::{models::UserModel, repository::UserRepository};

const MIN_PASSWORD_LENGTH: usize = 8;

/// Business logic for account registration, login, request authentication,
/// and logout. Owns the credential hasher and the token signing config; the
/// user store is the only shared mutable resource it touches.
pub struct AuthService {
    repository: Arc<dyn UserRepository + Send + Sync>,
    token_config: TokenConfig,
    password_hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(
        repository: Arc<dyn UserRepository + Send + Sync>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            repository,
            token_config,
            password_hasher: PasswordHasher::new(),
        }
    }

    /// Constructor with an explicit hasher, used by tests to lower the work
    /// factor
    pub fn with_hasher(
        repository: Arc<dyn UserRepository + Send + Sync>,
        token_config: TokenConfig,
        password_hasher: PasswordHasher,
    ) -> Self {
        Self {
            repository,
            token_config,
            password_hasher,
        }
    }

    /// Creates a new account with a hashed password and an empty session set
    #[instrument(skip(self, request))]
    pub async fn register(&self, request: RegisterRequest) -> Result<(), AppError> {
        if request.first_name.is_empty()
            || request.last_name.is_empty()
            || request.email.is_empty()
            || request.password.is_empty()
        {
            return Err(AppError::Validation("All fields are required".to_string()));
        }

        if request.password.len() < MIN_PASSWORD_LENGTH {
            return Err(AppError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        if self.repository.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Validation(
                "User already exists with this email".to_string(),
            ));
        }

        let password_hash = self.password_hasher.hash(&request.password)?;

        let user = UserModel::new(
            request.first_name,
            request.last_name,
            request.email,
            password_hash,
            request.picture_path.unwrap_or_default(),
            request.location.unwrap_or_else(|| "Unknown".to_string()),
            request.occupation.unwrap_or_else(|| "Unknown".to_string()),
        );

        self.repository.create(&user).await?;

        info!(user_id = %user.id, "User registered");
        Ok(())
    }

    /// Verifies credentials, issues a fresh token, prunes stale session
    /// records, and appends the new token to the session set.
    ///
    /// "No such user" and "wrong password" surface as the same failure so the
    /// response does not leak which check missed.
    #[instrument(skip(self, request))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        if request.email.is_empty() || request.password.is_empty() {
            return Err(AppError::Validation("All fields are required".to_string()));
        }

        let user = match self.repository.find_by_email(&request.email).await? {
            Some(user) => user,
            None => {
                warn!("Login attempt for unknown email");
                return Err(AppError::AccessDenied("Invalid credentials".to_string()));
            }
        };

        if !self
            .password_hasher
            .verify(&request.password, &user.password_hash)?
        {
            warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AppError::AccessDenied("Invalid credentials".to_string()));
        }

        let token = self.token_config.issue(&user.id)?;

        // Pruning runs only here; there is no background sweep
        let now = Utc::now();
        let mut session_set = prune_session_set(user.tokens.clone(), now);
        session_set.push(SessionToken::new(token.clone(), now));

        self.repository
            .update_session_set(&user.id, session_set)
            .await?;

        info!(user_id = %user.id, "Login succeeded, session set updated");

        Ok(LoginResponse {
            token,
            user: user.into(),
        })
    }

    /// Full per-request check: signature and ttl, then session-set membership
    /// of the exact presented token string.
    ///
    /// Every failure path collapses to the same AccessDenied; the cause is
    /// only logged.
    #[instrument(skip(self, token))]
    pub async fn authenticate(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.token_config.verify(token)?;

        let user = match self.repository.find_by_id(&claims.sub).await? {
            Some(user) => user,
            None => {
                warn!(user_id = %claims.sub, "Token decoded but user no longer exists");
                return Err(AppError::AccessDenied("Access denied".to_string()));
            }
        };

        if !user.tokens.iter().any(|record| record.token == token) {
            warn!(
                user_id = %claims.sub,
                "Token not in session set, may have been revoked"
            );
            return Err(AppError::AccessDenied("Access denied".to_string()));
        }

        Ok(claims)
    }

    /// Removes the exact token string from the user's session set.
    ///
    /// Revoking an already-absent token is a success: the unchanged set is
    /// persisted and the call returns Ok.
    #[instrument(skip(self, token))]
    pub async fn logout(&self, user_id: &str, token: &str) -> Result<(), AppError> {
        let user = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let session_set: Vec<SessionToken> = user
            .tokens
            .into_iter()
            .filter(|record| record.token != token)
            .collect();

        self.repository
            .update_session_set(user_id, session_set)
            .await?;

        info!(user_id = %user_id, "Session token revoked");
        Ok(())
    }
}
