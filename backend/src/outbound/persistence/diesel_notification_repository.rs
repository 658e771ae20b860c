//! PostgreSQL-backed `NotificationRepository` implementation using Diesel ORM.
//!
//! Every query is scoped by `recipient_id`; a notification id belonging to
//! another user behaves exactly like a missing one.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{NotificationRepository, NotificationRepositoryError};
use crate::domain::{
    ContentKind, ContentRef, Notification, NotificationId, NotificationKind, PageRequest, UserId,
};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::listing::page_bounds;
use super::models::{NewNotificationRow, NotificationRow};
use super::pool::{DbPool, PoolError};
use super::schema::notifications;

/// Diesel-backed implementation of the notification repository port.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> NotificationRepositoryError {
    map_basic_pool_error(error, |message| {
        NotificationRepositoryError::connection(message)
    })
}

fn map_diesel_error(error: diesel::result::Error) -> NotificationRepositoryError {
    map_basic_diesel_error(
        error,
        NotificationRepositoryError::query,
        NotificationRepositoryError::connection,
    )
}

fn row_to_notification(row: NotificationRow) -> Result<Notification, NotificationRepositoryError> {
    let kind: NotificationKind = row
        .kind
        .parse()
        .map_err(|err| NotificationRepositoryError::query(format!("invalid stored kind: {err}")))?;
    let target = match (row.target_kind, row.target_id) {
        (Some(target_kind), Some(target_id)) => {
            let target_kind: ContentKind = target_kind.parse().map_err(|_| {
                NotificationRepositoryError::query("invalid stored notification target")
            })?;
            Some(ContentRef::from_parts(target_kind, target_id))
        }
        _ => None,
    };
    Ok(Notification {
        id: NotificationId::from_uuid(row.id),
        recipient: UserId::from_uuid(row.recipient_id),
        kind,
        message: row.message,
        actor: row.actor_id.map(UserId::from_uuid),
        target,
        read: row.is_read,
        created_at: row.created_at,
    })
}

fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewNotificationRow {
            id: *notification.id.as_uuid(),
            recipient_id: *notification.recipient.as_uuid(),
            kind: notification.kind.as_str(),
            message: &notification.message,
            actor_id: notification.actor.as_ref().map(|actor| *actor.as_uuid()),
            target_kind: notification.target.map(|target| target.kind().as_str()),
            target_id: notification.target.map(|target| target.id()),
            is_read: notification.read,
            created_at: notification.created_at,
        };
        diesel::insert_into(notifications::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn list_for_recipient(
        &self,
        recipient: &UserId,
        page: &PageRequest,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        let (limit, offset) = page_bounds(page).map_err(NotificationRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        notifications::table
            .filter(notifications::recipient_id.eq(recipient.as_uuid()))
            .order((notifications::created_at.desc(), notifications::id.desc()))
            .limit(limit)
            .offset(offset)
            .select(NotificationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(row_to_notification)
            .collect()
    }

    async fn count_unread(&self, recipient: &UserId) -> Result<u64, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = notifications::table
            .filter(notifications::recipient_id.eq(recipient.as_uuid()))
            .filter(notifications::is_read.eq(false))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count_to_u64(count))
    }

    async fn mark_read(
        &self,
        recipient: &UserId,
        id: &NotificationId,
    ) -> Result<bool, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            notifications::table
                .filter(notifications::id.eq(id.as_uuid()))
                .filter(notifications::recipient_id.eq(recipient.as_uuid()))
                .filter(notifications::is_read.eq(false)),
        )
        .set(notifications::is_read.eq(true))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn mark_all_read(&self, recipient: &UserId) -> Result<u64, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            notifications::table
                .filter(notifications::recipient_id.eq(recipient.as_uuid()))
                .filter(notifications::is_read.eq(false)),
        )
        .set(notifications::is_read.eq(true))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(u64::try_from(updated).unwrap_or(u64::MAX))
    }

    async fn mark_read_for_target(
        &self,
        recipient: &UserId,
        target: &ContentRef,
    ) -> Result<u64, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            notifications::table
                .filter(notifications::recipient_id.eq(recipient.as_uuid()))
                .filter(notifications::target_kind.eq(target.kind().as_str()))
                .filter(notifications::target_id.eq(target.id()))
                .filter(notifications::is_read.eq(false)),
        )
        .set(notifications::is_read.eq(true))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(u64::try_from(updated).unwrap_or(u64::MAX))
    }

    async fn delete(
        &self,
        recipient: &UserId,
        id: &NotificationId,
    ) -> Result<bool, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(
            notifications::table
                .filter(notifications::id.eq(id.as_uuid()))
                .filter(notifications::recipient_id.eq(recipient.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;

    fn row(kind: &str, target_kind: Option<&str>) -> NotificationRow {
        NotificationRow {
            id: Uuid::new_v4(),
            recipient_id: Uuid::new_v4(),
            kind: kind.to_owned(),
            message: "Your report \"Pothole\" is now completed.".to_owned(),
            actor_id: None,
            target_kind: target_kind.map(str::to_owned),
            target_id: target_kind.map(|_| Uuid::new_v4()),
            is_read: false,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn targeted_rows_convert() {
        let notification =
            row_to_notification(row("STATUS_CHANGED", Some("report"))).expect("valid row");
        assert_eq!(notification.kind, NotificationKind::StatusChanged);
        assert!(matches!(notification.target, Some(ContentRef::Report(_))));
        assert!(!notification.read);
    }

    #[rstest]
    fn untargeted_rows_convert() {
        let notification =
            row_to_notification(row("ACCOUNT_VERIFIED", None)).expect("valid row");
        assert_eq!(notification.target, None);
    }

    #[rstest]
    fn unknown_kinds_are_query_errors() {
        let error = row_to_notification(row("BROADCAST", None)).expect_err("bad kind");
        assert!(matches!(error, NotificationRepositoryError::Query { .. }));
    }

    #[rstest]
    #[case(-3, 0)]
    #[case(42, 42)]
    fn counts_clamp_to_zero(#[case] raw: i64, #[case] expected: u64) {
        assert_eq!(count_to_u64(raw), expected);
    }
}
