//! Driving port for notification mutations.

use async_trait::async_trait;

use crate::domain::{
    ContentRef, Error, MarkAllReadOutcome, Notification, NotificationDraft, NotificationId, UserId,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationCommand: Send + Sync {
    /// Persist a notification and push it to the recipient's live
    /// connections, followed by their new unread count.
    ///
    /// Push failures are logged and do not fail the call.
    async fn create_notification(&self, draft: NotificationDraft) -> Result<Notification, Error>;

    /// Mark one notification read and return the new unread count.
    ///
    /// Already-read and foreign notifications are left untouched.
    async fn mark_read(&self, recipient: &UserId, id: NotificationId) -> Result<u64, Error>;

    /// Mark every notification of `recipient` read.
    async fn mark_all_read(&self, recipient: &UserId) -> Result<MarkAllReadOutcome, Error>;

    /// Mark the notifications linking to `target` read once `recipient`
    /// opens it. Returns how many changed; the new unread count is pushed
    /// only when that is non-zero.
    async fn mark_target_read(&self, recipient: &UserId, target: ContentRef)
    -> Result<u64, Error>;

    /// Delete one notification and return the new unread count.
    ///
    /// Missing or foreign notifications yield `not_found`.
    async fn delete_notification(
        &self,
        recipient: &UserId,
        id: NotificationId,
    ) -> Result<u64, Error>;
}
