//! Port abstraction for account persistence adapters and their errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Email, PasswordHash, ProfileUpdate, Role, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String }
            => "user repository connection failed: {message}" as unavailable,
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}" as internal,
        /// Another account already uses the email address.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

/// Stored account together with its password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: PasswordHash,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account; fails with `DuplicateEmail` when the address is taken.
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account and its password hash by normalised email.
    async fn find_credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserCredentials>, UserPersistenceError>;

    /// List accounts, newest first, optionally restricted to one role.
    async fn list(&self, role: Option<Role>) -> Result<Vec<User>, UserPersistenceError>;

    /// Apply a profile update stamped `at`, returning the updated account if
    /// it exists.
    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Set the verified flag.
    ///
    /// Returns `None` when the account does not exist, otherwise whether the
    /// flag changed.
    async fn mark_verified(
        &self,
        id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<Option<bool>, UserPersistenceError>;

    /// Delete an account; returns whether a row was removed.
    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError>;
}
