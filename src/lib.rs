// Library crate for the sociable backend
// This file exposes the public API for integration tests

pub mod auth;
pub mod shared;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use auth::service::AuthService;
pub use auth::token::TokenConfig;
pub use shared::{AppError, AppState};
pub use user::{PublicUser, UserModel, UserRepository};
