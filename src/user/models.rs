use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::models::SessionToken;

/// Stored user record: identity fields plus credential hash and the
/// session set of currently-valid bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserModel {
    pub id: String, // UUID v4 as string
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub picture_path: String,
    pub friends: Vec<String>,
    pub location: String,
    pub occupation: String,
    pub tokens: Vec<SessionToken>, // insertion order = issuance order
    pub created_at: DateTime<Utc>,
}

impl UserModel {
    pub fn new(
        first_name: String,
        last_name: String,
        email: String,
        password_hash: String,
        picture_path: String,
        location: String,
        occupation: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            first_name,
            last_name,
            email,
            password_hash,
            picture_path,
            friends: Vec::new(),
            location,
            occupation,
            tokens: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// User record as exposed to callers: credential hash and session set stripped
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicUser {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub picture_path: String,
    pub friends: Vec<String>,
    pub location: String,
    pub occupation: String,
}

impl From<UserModel> for PublicUser {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            picture_path: user.picture_path,
            friends: user.friends,
            location: user.location,
            occupation: user.occupation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> UserModel {
        UserModel::new(
            "Ada".to_string(),
            "Lovelace".to_string(),
            "ada@example.com".to_string(),
            "$2b$10$hash".to_string(),
            String::new(),
            "London".to_string(),
            "Engineer".to_string(),
        )
    }

    #[test]
    fn test_new_user_has_empty_session_set() {
        let user = sample_user();
        assert!(!user.id.is_empty());
        assert!(user.tokens.is_empty());
        assert!(user.friends.is_empty());
    }

    #[test]
    fn test_public_user_strips_credentials() {
        let user = sample_user();
        let public = PublicUser::from(user.clone());

        assert_eq!(public.id, user.id);
        assert_eq!(public.email, user.email);

        let json = serde_json::to_string(&public).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("tokens"));
    }
}
