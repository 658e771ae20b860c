//! Driving port for account reads and token authentication.

use async_trait::async_trait;

use crate::domain::{Actor, Error, Role, User};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// Resolve a bearer token into the calling actor.
    ///
    /// Only the signature and expiry are checked.
    async fn authenticate(&self, token: &str) -> Result<Actor, Error>;

    /// The caller's own profile.
    async fn me(&self, actor: &Actor) -> Result<User, Error>;

    /// All accounts, optionally filtered by role (administrators only).
    async fn list_users(&self, actor: &Actor, role: Option<Role>) -> Result<Vec<User>, Error>;
}
