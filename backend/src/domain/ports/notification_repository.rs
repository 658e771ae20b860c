//! Port for notification persistence.
//!
//! Every operation other than `insert` is scoped to the recipient: a user can
//! never read, mark or delete someone else's notification.

use async_trait::async_trait;

use crate::domain::{ContentRef, Notification, NotificationId, PageRequest, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification repository adapters.
    pub enum NotificationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String }
            => "notification repository connection failed: {message}" as unavailable,
        /// Query or mutation failed during execution.
        Query { message: String } => "notification repository query failed: {message}" as internal,
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError>;

    /// The recipient's notifications, newest first.
    async fn list_for_recipient(
        &self,
        recipient: &UserId,
        page: &PageRequest,
    ) -> Result<Vec<Notification>, NotificationRepositoryError>;

    /// Number of unread notifications held by `recipient`.
    async fn count_unread(&self, recipient: &UserId) -> Result<u64, NotificationRepositoryError>;

    /// Mark one notification read; returns whether an unread row changed.
    async fn mark_read(
        &self,
        recipient: &UserId,
        id: &NotificationId,
    ) -> Result<bool, NotificationRepositoryError>;

    /// Mark every unread notification read; returns the number changed.
    async fn mark_all_read(&self, recipient: &UserId) -> Result<u64, NotificationRepositoryError>;

    /// Mark the unread notifications linking to `target` read; returns the
    /// number changed.
    async fn mark_read_for_target(
        &self,
        recipient: &UserId,
        target: &ContentRef,
    ) -> Result<u64, NotificationRepositoryError>;

    /// Delete one notification; returns whether a row was removed.
    async fn delete(
        &self,
        recipient: &UserId,
        id: &NotificationId,
    ) -> Result<bool, NotificationRepositoryError>;
}
