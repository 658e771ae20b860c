//! Account domain services: registration, login, profiles and
//! administration.
//!
//! Tokens carry the role at issue time; role checks in this module use the
//! authenticated [`Actor`] rather than re-reading the account.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    AccessTokenCodec, AccessTokenError, AccountCommand, AccountQuery, AuthSession,
    CreateMunicipalityAccountRequest, Notifier, PasswordHasher, RegisterRequest, UserCredentials,
    UserRepository,
};
use crate::domain::service_support::{invalid, map_user_error, port_error, require_admin};
use crate::domain::{
    Actor, CivicEvent, Error, LoginCredentials, ProfileUpdate, Role, User, UserDraft, UserId,
};

fn map_token_error(error: AccessTokenError) -> Error {
    match error {
        AccessTokenError::Expired => Error::unauthorized("Token has expired."),
        AccessTokenError::Malformed | AccessTokenError::InvalidSignature => {
            Error::unauthorized("Invalid token.")
        }
        other => port_error(other),
    }
}

fn user_not_found() -> Error {
    Error::not_found("User not found.")
}

/// Account service implementing the account driving ports.
#[derive(Clone)]
pub struct AccountService<U> {
    users: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn AccessTokenCodec>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl<U> AccountService<U> {
    pub fn new(
        users: Arc<U>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn AccessTokenCodec>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            notifier,
            clock,
        }
    }
}

impl<U> AccountService<U>
where
    U: UserRepository,
{
    fn session_for(&self, user: User) -> Result<AuthSession, Error> {
        let token = self
            .tokens
            .issue(user.id(), user.role())
            .map_err(map_token_error)?;
        Ok(AuthSession { token, user })
    }

    async fn find(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(user_not_found)
    }
}

#[async_trait]
impl<U> AccountCommand for AccountService<U>
where
    U: UserRepository,
{
    async fn register(&self, request: RegisterRequest) -> Result<AuthSession, Error> {
        let user = User::new(UserDraft {
            id: UserId::random(),
            full_name: request.full_name,
            email: request.email,
            role: Role::User,
            verified: false,
            municipality: request.municipality,
            ward: request.ward,
            phone: request.phone,
            profile_picture: None,
            citizenship_document: None,
            created_at: self.clock.utc(),
        })
        .map_err(invalid)?;
        let password_hash = self
            .hasher
            .hash(&request.password)
            .await
            .map_err(port_error)?;

        self.users
            .insert(&user, &password_hash)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id(), "account registered");

        self.session_for(user)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error> {
        let UserCredentials {
            user,
            password_hash,
        } = self
            .users
            .find_credentials_by_email(credentials.email())
            .await
            .map_err(map_user_error)?
            .ok_or_else(user_not_found)?;

        let matches = self
            .hasher
            .verify(credentials.password(), &password_hash)
            .await
            .map_err(port_error)?;
        if !matches {
            warn!(user_id = %user.id(), "login rejected: invalid password");
            return Err(Error::unauthorized("Invalid password."));
        }

        info!(user_id = %user.id(), "login succeeded");
        self.session_for(user)
    }

    async fn update_profile(&self, actor: &Actor, update: ProfileUpdate) -> Result<User, Error> {
        if update.is_empty() {
            return self.find(&actor.id).await;
        }
        self.users
            .update_profile(&actor.id, &update, self.clock.utc())
            .await
            .map_err(map_user_error)?
            .ok_or_else(user_not_found)
    }

    async fn verify_user(&self, actor: &Actor, user_id: UserId) -> Result<User, Error> {
        require_admin(actor)?;
        let changed = self
            .users
            .mark_verified(&user_id, self.clock.utc())
            .await
            .map_err(map_user_error)?
            .ok_or_else(user_not_found)?;

        if changed {
            info!(user_id = %user_id, admin_id = %actor.id, "account verified");
            self.notifier
                .publish(CivicEvent::AccountVerified {
                    user: user_id.clone(),
                    actor: actor.id.clone(),
                })
                .await;
        }

        self.find(&user_id).await
    }

    async fn create_municipality_account(
        &self,
        actor: &Actor,
        request: CreateMunicipalityAccountRequest,
    ) -> Result<User, Error> {
        require_admin(actor)?;
        let user = User::new(UserDraft {
            id: UserId::random(),
            full_name: request.full_name,
            email: request.email,
            role: Role::Municipality,
            verified: true,
            municipality: Some(request.jurisdiction.municipality().to_owned()),
            ward: Some(request.jurisdiction.ward().to_owned()),
            phone: request.phone,
            profile_picture: None,
            citizenship_document: None,
            created_at: self.clock.utc(),
        })
        .map_err(invalid)?;
        let password_hash = self
            .hasher
            .hash(&request.password)
            .await
            .map_err(port_error)?;

        self.users
            .insert(&user, &password_hash)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id(), admin_id = %actor.id, "municipality account created");
        Ok(user)
    }

    async fn delete_user(&self, actor: &Actor, user_id: UserId) -> Result<(), Error> {
        require_admin(actor)?;
        if actor.id == user_id {
            return Err(Error::invalid_request(
                "Administrators cannot delete their own account.",
            ));
        }
        let removed = self
            .users
            .delete(&user_id)
            .await
            .map_err(map_user_error)?;
        if !removed {
            return Err(user_not_found());
        }
        info!(user_id = %user_id, admin_id = %actor.id, "account deleted");
        Ok(())
    }
}

#[async_trait]
impl<U> AccountQuery for AccountService<U>
where
    U: UserRepository,
{
    async fn authenticate(&self, token: &str) -> Result<Actor, Error> {
        self.tokens
            .verify(token)
            .map(Actor::from)
            .map_err(map_token_error)
    }

    async fn me(&self, actor: &Actor) -> Result<User, Error> {
        self.find(&actor.id).await
    }

    async fn list_users(&self, actor: &Actor, role: Option<Role>) -> Result<Vec<User>, Error> {
        require_admin(actor)?;
        self.users.list(role).await.map_err(map_user_error)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
