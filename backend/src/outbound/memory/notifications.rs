//! Notification repository over the in-memory store.

use async_trait::async_trait;

use crate::domain::ports::{NotificationRepository, NotificationRepositoryError};
use crate::domain::{ContentRef, Notification, NotificationId, PageRequest, UserId};

use super::{InMemoryStore, paginate};

#[async_trait]
impl NotificationRepository for InMemoryStore {
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError> {
        let mut state = self.lock().map_err(NotificationRepositoryError::query)?;
        state.notifications.push(notification.clone());
        Ok(())
    }

    async fn list_for_recipient(
        &self,
        recipient: &UserId,
        page: &PageRequest,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        let state = self.lock().map_err(NotificationRepositoryError::query)?;
        let mut mine: Vec<Notification> = state
            .notifications
            .iter()
            .rev()
            .filter(|notification| notification.recipient == *recipient)
            .cloned()
            .collect();
        mine.sort_by_key(|notification| std::cmp::Reverse(notification.created_at));
        Ok(paginate(mine, page))
    }

    async fn count_unread(&self, recipient: &UserId) -> Result<u64, NotificationRepositoryError> {
        let state = self.lock().map_err(NotificationRepositoryError::query)?;
        let unread = state
            .notifications
            .iter()
            .filter(|notification| notification.recipient == *recipient && !notification.read)
            .count();
        Ok(u64::try_from(unread).unwrap_or(u64::MAX))
    }

    async fn mark_read(
        &self,
        recipient: &UserId,
        id: &NotificationId,
    ) -> Result<bool, NotificationRepositoryError> {
        let mut state = self.lock().map_err(NotificationRepositoryError::query)?;
        let Some(notification) = state.notifications.iter_mut().find(|notification| {
            notification.id == *id && notification.recipient == *recipient && !notification.read
        }) else {
            return Ok(false);
        };
        notification.read = true;
        Ok(true)
    }

    async fn mark_all_read(&self, recipient: &UserId) -> Result<u64, NotificationRepositoryError> {
        let mut state = self.lock().map_err(NotificationRepositoryError::query)?;
        let mut updated = 0_u64;
        for notification in state
            .notifications
            .iter_mut()
            .filter(|notification| notification.recipient == *recipient && !notification.read)
        {
            notification.read = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn mark_read_for_target(
        &self,
        recipient: &UserId,
        target: &ContentRef,
    ) -> Result<u64, NotificationRepositoryError> {
        let mut state = self.lock().map_err(NotificationRepositoryError::query)?;
        let mut updated = 0_u64;
        for notification in state.notifications.iter_mut().filter(|notification| {
            notification.recipient == *recipient
                && !notification.read
                && notification.target.as_ref() == Some(target)
        }) {
            notification.read = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete(
        &self,
        recipient: &UserId,
        id: &NotificationId,
    ) -> Result<bool, NotificationRepositoryError> {
        let mut state = self.lock().map_err(NotificationRepositoryError::query)?;
        let before = state.notifications.len();
        state
            .notifications
            .retain(|notification| !(notification.id == *id && notification.recipient == *recipient));
        Ok(state.notifications.len() != before)
    }
}
