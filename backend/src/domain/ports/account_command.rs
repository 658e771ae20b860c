//! Driving port for account mutations: registration, login and
//! administration.

use async_trait::async_trait;

use crate::domain::{
    Actor, Email, Error, FullName, Jurisdiction, LoginCredentials, NewPassword, ProfileUpdate,
    User, UserId,
};

/// Validated self-registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    pub full_name: FullName,
    pub email: Email,
    pub password: NewPassword,
    pub phone: Option<String>,
    pub municipality: Option<String>,
    pub ward: Option<String>,
}

/// Validated input for an administrator creating a staff account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMunicipalityAccountRequest {
    pub full_name: FullName,
    pub email: Email,
    pub password: NewPassword,
    pub phone: Option<String>,
    pub jurisdiction: Jurisdiction,
}

/// Signed access token plus the account it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an unverified citizen account and sign a token for it.
    async fn register(&self, request: RegisterRequest) -> Result<AuthSession, Error>;

    /// Check credentials and sign a token.
    ///
    /// Unknown addresses yield `not_found`; wrong passwords `unauthorized`.
    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error>;

    /// Update the caller's own profile.
    async fn update_profile(&self, actor: &Actor, update: ProfileUpdate) -> Result<User, Error>;

    /// Mark an account verified (administrators only). Idempotent.
    async fn verify_user(&self, actor: &Actor, user_id: UserId) -> Result<User, Error>;

    /// Create a verified municipality staff account (administrators only).
    async fn create_municipality_account(
        &self,
        actor: &Actor,
        request: CreateMunicipalityAccountRequest,
    ) -> Result<User, Error>;

    /// Delete an account (administrators only).
    async fn delete_user(&self, actor: &Actor, user_id: UserId) -> Result<(), Error>;
}
