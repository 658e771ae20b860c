//! Notification delivery.
//!
//! Every notification is persisted first, so clients that are offline or
//! fall back to polling see the same history as live ones. When the
//! recipient has open connections the service then pushes the record and
//! a fresh unread count. Push failures are logged and never surface to the
//! caller: the notification is already durable.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, warn};

use crate::domain::ports::{
    NotificationCommand, NotificationPush, NotificationQuery, NotificationRepository, Notifier,
};
use crate::domain::service_support::port_error;
use crate::domain::{
    CivicEvent, ContentRef, Error, MarkAllReadOutcome, Notification, NotificationDraft,
    NotificationId, PageRequest, UserId,
};

/// Notification service implementing the notification driving ports and
/// the [`Notifier`] used by other services.
#[derive(Clone)]
pub struct NotificationService<R> {
    repo: Arc<R>,
    push: Arc<dyn NotificationPush>,
    clock: Arc<dyn Clock>,
}

impl<R> NotificationService<R> {
    /// Create a service over a repository and a push adapter.
    pub fn new(repo: Arc<R>, push: Arc<dyn NotificationPush>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, push, clock }
    }
}

impl<R> NotificationService<R>
where
    R: NotificationRepository,
{
    fn push_unread_count(&self, recipient: &UserId, count: u64) {
        if let Err(error) = self.push.push_unread_count(recipient, count) {
            warn!(%error, user_id = %recipient, "failed to push unread count");
        }
    }

    /// Recount, push the new count, and return it.
    async fn refresh_unread_count(&self, recipient: &UserId) -> Result<u64, Error> {
        let count = self
            .repo
            .count_unread(recipient)
            .await
            .map_err(port_error)?;
        self.push_unread_count(recipient, count);
        Ok(count)
    }
}

#[async_trait]
impl<R> NotificationCommand for NotificationService<R>
where
    R: NotificationRepository,
{
    async fn create_notification(&self, draft: NotificationDraft) -> Result<Notification, Error> {
        let notification =
            Notification::from_draft(NotificationId::random(), draft, self.clock.utc());
        self.repo
            .insert(&notification)
            .await
            .map_err(port_error)?;

        let recipient = &notification.recipient;
        match self.push.push_notification(recipient, &notification) {
            Ok(0) => {
                debug!(
                    notification_id = %notification.id,
                    user_id = %recipient,
                    "recipient offline; notification stored for polling"
                );
            }
            Ok(connections) => {
                debug!(
                    notification_id = %notification.id,
                    connections,
                    "notification pushed"
                );
                match self.repo.count_unread(recipient).await {
                    Ok(count) => self.push_unread_count(recipient, count),
                    Err(error) => {
                        warn!(%error, user_id = %recipient, "failed to count unread notifications");
                    }
                }
            }
            Err(error) => {
                warn!(
                    %error,
                    notification_id = %notification.id,
                    "failed to push notification"
                );
            }
        }

        Ok(notification)
    }

    async fn mark_read(&self, recipient: &UserId, id: NotificationId) -> Result<u64, Error> {
        let changed = self
            .repo
            .mark_read(recipient, &id)
            .await
            .map_err(port_error)?;
        if !changed {
            debug!(notification_id = %id, "mark read was a no-op");
        }
        self.refresh_unread_count(recipient).await
    }

    async fn mark_all_read(&self, recipient: &UserId) -> Result<MarkAllReadOutcome, Error> {
        let updated = self
            .repo
            .mark_all_read(recipient)
            .await
            .map_err(port_error)?;
        let unread_count = self.refresh_unread_count(recipient).await?;
        Ok(MarkAllReadOutcome {
            updated,
            unread_count,
        })
    }

    async fn mark_target_read(
        &self,
        recipient: &UserId,
        target: ContentRef,
    ) -> Result<u64, Error> {
        let updated = self
            .repo
            .mark_read_for_target(recipient, &target)
            .await
            .map_err(port_error)?;
        if updated > 0 {
            debug!(user_id = %recipient, %target, updated, "opened content marked read");
            self.refresh_unread_count(recipient).await?;
        }
        Ok(updated)
    }

    async fn delete_notification(
        &self,
        recipient: &UserId,
        id: NotificationId,
    ) -> Result<u64, Error> {
        let removed = self
            .repo
            .delete(recipient, &id)
            .await
            .map_err(port_error)?;
        if !removed {
            return Err(Error::not_found("Notification not found."));
        }
        self.refresh_unread_count(recipient).await
    }
}

#[async_trait]
impl<R> NotificationQuery for NotificationService<R>
where
    R: NotificationRepository,
{
    async fn list_notifications(
        &self,
        recipient: &UserId,
        page: PageRequest,
    ) -> Result<Vec<Notification>, Error> {
        self.repo
            .list_for_recipient(recipient, &page)
            .await
            .map_err(port_error)
    }

    async fn unread_count(&self, recipient: &UserId) -> Result<u64, Error> {
        self.repo
            .count_unread(recipient)
            .await
            .map_err(port_error)
    }
}

#[async_trait]
impl<R> Notifier for NotificationService<R>
where
    R: NotificationRepository,
{
    async fn publish(&self, event: CivicEvent) {
        let name = event.name();
        let Some(draft) = event.into_notification() else {
            debug!(event = name, "event produced no notification");
            return;
        };
        if let Err(error) = self.create_notification(draft).await {
            warn!(%error, event = name, "failed to record notification");
        }
    }
}

#[cfg(test)]
#[path = "notification_service_tests.rs"]
mod tests;
