//! Port for password hashing.

use async_trait::async_trait;

use crate::domain::{NewPassword, PasswordHash};

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashers.
    pub enum PasswordHasherError {
        /// Hashing failed.
        Hash { message: String } => "password hashing failed: {message}" as internal,
        /// The stored hash could not be parsed.
        InvalidHash { message: String } => "stored password hash is invalid: {message}" as internal,
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &NewPassword) -> Result<PasswordHash, PasswordHasherError>;

    /// Whether `password` matches `hash`.
    async fn verify(&self, password: &str, hash: &PasswordHash)
    -> Result<bool, PasswordHasherError>;
}
