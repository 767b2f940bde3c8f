use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::UserModel;
use crate::auth::models::SessionToken;
use crate::shared::AppError;

/// Data-store collaborator for user records. The auth core treats this as an
/// opaque keyed store with a subfield update for the session set.
///
/// There is no optimistic-concurrency guard: concurrent logins or logouts for
/// the same user race read-modify-write on the session set, last writer wins.
#[async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserModel>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError>;
    async fn create(&self, user: &UserModel) -> Result<(), AppError>;
    async fn update_session_set(
        &self,
        user_id: &str,
        session_set: Vec<SessionToken>,
    ) -> Result<(), AppError>;
}

/// In-memory implementation of UserRepository for development and testing
///
/// Data is stored in memory and lost when the application restarts.
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<String, UserModel>>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an in-memory repository with pre-populated users
    pub fn with_users(users: Vec<UserModel>) -> Self {
        let mut user_map = HashMap::new();
        for user in users {
            user_map.insert(user.id.clone(), user);
        }

        Self {
            users: Mutex::new(user_map),
        }
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    /// Returns the current session set for a user (useful for assertions)
    pub fn session_set(&self, user_id: &str) -> Option<Vec<SessionToken>> {
        self.users
            .lock()
            .unwrap()
            .get(user_id)
            .map(|u| u.tokens.clone())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        let users = self.users.lock().unwrap();
        let user = users.get(user_id).cloned();

        match &user {
            Some(u) => debug!(user_id = %user_id, email = %u.email, "User found in memory"),
            None => debug!(user_id = %user_id, "User not found in memory"),
        }

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    #[instrument(skip(self, user))]
    async fn create(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, email = %user.email, "Creating user in memory");

        let mut users = self.users.lock().unwrap();
        if users.contains_key(&user.id) {
            warn!(user_id = %user.id, "User already exists in memory");
            return Err(AppError::Database("User already exists".to_string()));
        }
        users.insert(user.id.clone(), user.clone());

        Ok(())
    }

    #[instrument(skip(self, session_set))]
    async fn update_session_set(
        &self,
        user_id: &str,
        session_set: Vec<SessionToken>,
    ) -> Result<(), AppError> {
        debug!(
            user_id = %user_id,
            session_count = session_set.len(),
            "Updating session set in memory"
        );

        let mut users = self.users.lock().unwrap();
        match users.get_mut(user_id) {
            Some(user) => {
                user.tokens = session_set;
                Ok(())
            }
            None => {
                warn!(user_id = %user_id, "Session set write matched no user");
                Err(AppError::Internal)
            }
        }
    }
}

/// PostgreSQL implementation of UserRepository. The session set and friends
/// list are stored as JSONB columns on the users row.
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<UserModel, AppError> {
        let tokens: serde_json::Value = row.get("tokens");
        let friends: serde_json::Value = row.get("friends");

        Ok(UserModel {
            id: row.get("id"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            picture_path: row.get("picture_path"),
            friends: serde_json::from_value(friends)
                .map_err(|e| AppError::Database(e.to_string()))?,
            location: row.get("location"),
            occupation: row.get("occupation"),
            tokens: serde_json::from_value(tokens)
                .map_err(|e| AppError::Database(e.to_string()))?,
            created_at: row.get("created_at"),
        })
    }
}

const USER_COLUMNS: &str = "id, first_name, last_name, email, password_hash, picture_path, \
                            friends, location, occupation, tokens, created_at";

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, user_id = %user_id, "Failed to fetch user by id");
                AppError::Database(e.to_string())
            })?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to fetch user by email");
                AppError::Database(e.to_string())
            })?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    #[instrument(skip(self, user))]
    async fn create(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, "Creating user in database");

        let friends = serde_json::to_value(&user.friends)
            .map_err(|e| AppError::Database(e.to_string()))?;
        let tokens = serde_json::to_value(&user.tokens)
            .map_err(|e| AppError::Database(e.to_string()))?;

        sqlx::query(
            "INSERT INTO users (id, first_name, last_name, email, password_hash, picture_path, \
             friends, location, occupation, tokens, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(&user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.picture_path)
        .bind(friends)
        .bind(&user.location)
        .bind(&user.occupation)
        .bind(tokens)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create user in database");
            AppError::Database(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self, session_set))]
    async fn update_session_set(
        &self,
        user_id: &str,
        session_set: Vec<SessionToken>,
    ) -> Result<(), AppError> {
        debug!(
            user_id = %user_id,
            session_count = session_set.len(),
            "Updating session set in database"
        );

        let tokens = serde_json::to_value(&session_set)
            .map_err(|e| AppError::Database(e.to_string()))?;

        let result = sqlx::query("UPDATE users SET tokens = $2 WHERE id = $1")
            .bind(user_id)
            .bind(tokens)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, user_id = %user_id, "Failed to update session set");
                AppError::Database(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            warn!(user_id = %user_id, "Session set write matched no user");
            return Err(AppError::Internal);
        }

        Ok(())
    }
}
