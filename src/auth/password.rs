use tracing::debug;

use crate::shared::AppError;

/// Default bcrypt work factor
pub const DEFAULT_COST: u32 = 10;

/// Salted one-way password hashing with a configurable work factor.
/// Comparison is constant-time, provided by the bcrypt primitive.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self { cost: DEFAULT_COST }
    }

    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    /// Hashes a plaintext password with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        bcrypt::hash(plaintext, self.cost).map_err(|e| {
            debug!(error = %e, "Password hashing failed");
            AppError::Internal
        })
    }

    /// Verifies a plaintext password against a stored hash.
    ///
    /// A mismatch is `Ok(false)`, not an error; callers decide how to
    /// surface it without leaking which check failed.
    pub fn verify(&self, plaintext: &str, hashed: &str) -> Result<bool, AppError> {
        bcrypt::verify(plaintext, hashed).map_err(|e| {
            debug!(error = %e, "Password verification failed");
            AppError::Internal
        })
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
