//! Port for pushing live notification events to connected clients.
//!
//! Pushing is fire-and-forget: implementations enqueue frames for every live
//! connection of the recipient and return immediately.

use crate::domain::{Notification, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised while pushing to live connections.
    pub enum NotificationPushError {
        /// The event could not be encoded or enqueued.
        Delivery { message: String } => "notification push failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait NotificationPush: Send + Sync {
    /// Push a `new_notification` event; returns the number of connections reached.
    fn push_notification(
        &self,
        recipient: &UserId,
        notification: &Notification,
    ) -> Result<usize, NotificationPushError>;

    /// Push an `unread_count` event; returns the number of connections reached.
    fn push_unread_count(
        &self,
        recipient: &UserId,
        count: u64,
    ) -> Result<usize, NotificationPushError>;
}

/// Push adapter for deployments and tests without live connections.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpNotificationPush;

impl NotificationPush for NoOpNotificationPush {
    fn push_notification(
        &self,
        _recipient: &UserId,
        _notification: &Notification,
    ) -> Result<usize, NotificationPushError> {
        Ok(0)
    }

    fn push_unread_count(
        &self,
        _recipient: &UserId,
        _count: u64,
    ) -> Result<usize, NotificationPushError> {
        Ok(0)
    }
}
