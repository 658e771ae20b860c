//! Helpers shared by the domain services.

use std::fmt::Display;

use crate::domain::ports::{PortFailure, UserPersistenceError, UserRepository};
use crate::domain::{Actor, ContentKind, ContentRef, Error, User, UserId};

/// Map a validation failure onto `invalid_request`.
pub(super) fn invalid(error: impl Display) -> Error {
    Error::invalid_request(error.to_string())
}

/// Surface a port failure through its declared domain mapping.
///
/// Unmapped variants become `internal`; services match those first when
/// they carry meaning for the caller.
pub(super) fn port_error(error: impl PortFailure) -> Error {
    error
        .as_domain_error()
        .unwrap_or_else(|| Error::internal(error.to_string()))
}

pub(super) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::DuplicateEmail { .. } => {
            Error::conflict("Email is already registered.")
        }
        other => port_error(other),
    }
}

/// `not_found` naming the kind of content.
pub(super) fn content_not_found(kind: ContentKind) -> Error {
    match kind {
        ContentKind::Report => Error::not_found("Report not found."),
        ContentKind::Suggestion => Error::not_found("Suggestion not found."),
    }
}

pub(super) fn target_not_found(target: &ContentRef) -> Error {
    content_not_found(target.kind())
}

pub(super) fn require_admin(actor: &Actor) -> Result<(), Error> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(Error::forbidden("Administrator access required."))
    }
}

pub(super) fn require_staff(actor: &Actor) -> Result<(), Error> {
    if actor.is_staff() {
        Ok(())
    } else {
        Err(Error::forbidden("Staff access required."))
    }
}

/// Allow the owner of a resource or an administrator.
pub(super) fn require_owner_or_admin(actor: &Actor, owner: &UserId) -> Result<(), Error> {
    if actor.is_admin() || &actor.id == owner {
        Ok(())
    } else {
        Err(Error::forbidden(
            "Only the author or an administrator can do this.",
        ))
    }
}

/// Load the caller's account; a valid token for a deleted account is
/// treated as unauthenticated.
pub(super) async fn load_account<U>(users: &U, actor: &Actor) -> Result<User, Error>
where
    U: UserRepository + ?Sized,
{
    users
        .find_by_id(&actor.id)
        .await
        .map_err(map_user_error)?
        .ok_or_else(|| Error::unauthorized("Account no longer exists."))
}
