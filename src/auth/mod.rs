// Public API - what other modules can use
pub use handlers::{login, logout, me, register};
pub use middleware::require_auth;
pub use types::{BearerToken, Claims, LoginRequest, LoginResponse, RegisterRequest};

// Internal modules
mod handlers;
mod middleware;
pub mod models;
pub mod password;
pub mod service;
pub mod token;
mod types;
