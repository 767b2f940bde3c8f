use serde::{Deserialize, Serialize};

use crate::user::models::PublicUser;

/// JWT claims carried by every issued bearer token. The unique jti keeps
/// every issued token distinct, so a token string can only ever belong to
/// one user's session set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String, // user id
    pub jti: String, // Unique token id (standard JWT claim)
    pub exp: usize,  // Expiration timestamp (standard JWT claim)
    pub iat: usize,  // Issued at timestamp (standard JWT claim)
}

/// Raw bearer string as presented by the client, attached to request
/// extensions by the auth gate so handlers like logout can revoke it
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub picture_path: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: the fresh bearer token plus the sanitized user record
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}
