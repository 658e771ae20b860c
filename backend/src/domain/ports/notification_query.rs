//! Driving port for notification reads; the polling fallback for clients
//! without a live connection.

use async_trait::async_trait;

use crate::domain::{Error, Notification, PageRequest, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationQuery: Send + Sync {
    /// Newest first.
    async fn list_notifications(
        &self,
        recipient: &UserId,
        page: PageRequest,
    ) -> Result<Vec<Notification>, Error>;

    async fn unread_count(&self, recipient: &UserId) -> Result<u64, Error>;
}
