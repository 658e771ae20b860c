//! Tests for notification delivery.

use std::sync::Arc;

use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockNotificationPush, MockNotificationRepository, NotificationPushError,
    NotificationRepositoryError,
};
use crate::domain::{ContentRef, ErrorCode, NotificationKind, ReportId};
use crate::test_support::{fixture_clock, fixture_timestamp};

#[fixture]
fn recipient() -> UserId {
    UserId::random()
}

fn draft_for(recipient: &UserId) -> NotificationDraft {
    NotificationDraft {
        recipient: recipient.clone(),
        kind: NotificationKind::NewUpvote,
        message: "Someone upvoted your report.".to_owned(),
        actor: Some(UserId::random()),
        target: Some(ContentRef::Report(ReportId::random())),
    }
}

fn service(
    repo: MockNotificationRepository,
    push: MockNotificationPush,
) -> NotificationService<MockNotificationRepository> {
    NotificationService::new(Arc::new(repo), Arc::new(push), fixture_clock())
}

#[rstest]
#[tokio::test]
async fn create_pushes_record_then_unread_count_to_live_recipient(recipient: UserId) {
    let mut repo = MockNotificationRepository::new();
    repo.expect_insert().times(1).return_once(|_| Ok(()));
    repo.expect_count_unread()
        .with(eq(recipient.clone()))
        .times(1)
        .return_once(|_| Ok(4));

    let mut push = MockNotificationPush::new();
    push.expect_push_notification()
        .times(1)
        .returning(|_, notification| {
            assert!(!notification.read);
            Ok(2)
        });
    push.expect_push_unread_count()
        .withf(|_, count| *count == 4)
        .times(1)
        .returning(|_, _| Ok(2));

    let created = service(repo, push)
        .create_notification(draft_for(&recipient))
        .await
        .expect("notification created");

    assert_eq!(created.recipient, recipient);
    assert_eq!(created.created_at, fixture_timestamp());
    assert!(!created.read);
}

#[rstest]
#[tokio::test]
async fn create_for_offline_recipient_only_persists(recipient: UserId) {
    let mut repo = MockNotificationRepository::new();
    repo.expect_insert().times(1).return_once(|_| Ok(()));
    repo.expect_count_unread().times(0);

    let mut push = MockNotificationPush::new();
    push.expect_push_notification()
        .times(1)
        .returning(|_, _| Ok(0));
    push.expect_push_unread_count().times(0);

    service(repo, push)
        .create_notification(draft_for(&recipient))
        .await
        .expect("offline delivery still succeeds");
}

#[rstest]
#[tokio::test]
async fn push_failure_does_not_fail_creation(recipient: UserId) {
    let mut repo = MockNotificationRepository::new();
    repo.expect_insert().times(1).return_once(|_| Ok(()));

    let mut push = MockNotificationPush::new();
    push.expect_push_notification()
        .times(1)
        .returning(|_, _| Err(NotificationPushError::delivery("channel closed")));
    push.expect_push_unread_count().times(0);

    let created = service(repo, push)
        .create_notification(draft_for(&recipient))
        .await;

    assert!(created.is_ok());
}

#[rstest]
#[tokio::test]
async fn persistence_failure_skips_push(recipient: UserId) {
    let mut repo = MockNotificationRepository::new();
    repo.expect_insert()
        .times(1)
        .return_once(|_| Err(NotificationRepositoryError::connection("pool exhausted")));

    let mut push = MockNotificationPush::new();
    push.expect_push_notification().times(0);

    let error = service(repo, push)
        .create_notification(draft_for(&recipient))
        .await
        .expect_err("insert fails");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn mark_read_returns_and_pushes_new_count(recipient: UserId) {
    let id = NotificationId::random();
    let mut repo = MockNotificationRepository::new();
    repo.expect_mark_read()
        .with(eq(recipient.clone()), eq(id))
        .times(1)
        .return_once(|_, _| Ok(true));
    repo.expect_count_unread().times(1).return_once(|_| Ok(1));

    let mut push = MockNotificationPush::new();
    push.expect_push_unread_count()
        .withf(|_, count| *count == 1)
        .times(1)
        .returning(|_, _| Ok(1));

    let count = service(repo, push)
        .mark_read(&recipient, id)
        .await
        .expect("mark read succeeds");

    assert_eq!(count, 1);
}

#[rstest]
#[tokio::test]
async fn mark_read_of_foreign_notification_is_a_no_op(recipient: UserId) {
    let mut repo = MockNotificationRepository::new();
    repo.expect_mark_read().times(1).return_once(|_, _| Ok(false));
    repo.expect_count_unread().times(1).return_once(|_| Ok(3));

    let mut push = MockNotificationPush::new();
    push.expect_push_unread_count().returning(|_, _| Ok(0));

    let count = service(repo, push)
        .mark_read(&recipient, NotificationId::random())
        .await
        .expect("no-op is not an error");

    assert_eq!(count, 3);
}

#[rstest]
#[case(2, 1)]
#[case(0, 0)]
#[tokio::test]
async fn opening_a_target_pushes_only_when_something_changed(
    recipient: UserId,
    #[case] updated: u64,
    #[case] pushes: usize,
) {
    let target = ContentRef::Report(ReportId::random());
    let mut repo = MockNotificationRepository::new();
    repo.expect_mark_read_for_target()
        .with(eq(recipient.clone()), eq(target))
        .times(1)
        .return_once(move |_, _| Ok(updated));
    repo.expect_count_unread().times(pushes).returning(|_| Ok(0));

    let mut push = MockNotificationPush::new();
    push.expect_push_unread_count()
        .withf(|_, count| *count == 0)
        .times(pushes)
        .returning(|_, _| Ok(1));

    let changed = service(repo, push)
        .mark_target_read(&recipient, target)
        .await
        .expect("mark target read succeeds");

    assert_eq!(changed, updated);
}

#[rstest]
#[tokio::test]
async fn mark_all_read_reports_rows_changed_and_zero_unread(recipient: UserId) {
    let mut repo = MockNotificationRepository::new();
    repo.expect_mark_all_read().times(1).return_once(|_| Ok(5));
    repo.expect_count_unread().times(1).return_once(|_| Ok(0));

    let mut push = MockNotificationPush::new();
    push.expect_push_unread_count().returning(|_, _| Ok(1));

    let outcome = service(repo, push)
        .mark_all_read(&recipient)
        .await
        .expect("mark all read succeeds");

    assert_eq!(
        outcome,
        MarkAllReadOutcome {
            updated: 5,
            unread_count: 0
        }
    );
}

#[rstest]
#[tokio::test]
async fn delete_of_missing_notification_is_not_found(recipient: UserId) {
    let mut repo = MockNotificationRepository::new();
    repo.expect_delete().times(1).return_once(|_, _| Ok(false));
    repo.expect_count_unread().times(0);

    let mut push = MockNotificationPush::new();
    push.expect_push_unread_count().times(0);

    let error = service(repo, push)
        .delete_notification(&recipient, NotificationId::random())
        .await
        .expect_err("missing notification");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "Notification not found.");
}

#[rstest]
#[tokio::test]
async fn query_errors_map_to_internal(recipient: UserId) {
    let mut repo = MockNotificationRepository::new();
    repo.expect_count_unread()
        .times(1)
        .return_once(|_| Err(NotificationRepositoryError::query("syntax error")));

    let error = service(repo, MockNotificationPush::new())
        .unread_count(&recipient)
        .await
        .expect_err("query fails");

    assert_eq!(error.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn publish_ignores_self_actions(recipient: UserId) {
    let mut repo = MockNotificationRepository::new();
    repo.expect_insert().times(0);

    service(repo, MockNotificationPush::new())
        .publish(CivicEvent::UpvoteAdded {
            target: ContentRef::Report(ReportId::random()),
            target_author: recipient.clone(),
            actor: recipient,
        })
        .await;
}

#[rstest]
#[tokio::test]
async fn publish_swallows_persistence_failures(recipient: UserId) {
    let mut repo = MockNotificationRepository::new();
    repo.expect_insert()
        .times(1)
        .return_once(|_| Err(NotificationRepositoryError::connection("down")));

    service(repo, MockNotificationPush::new())
        .publish(CivicEvent::AccountVerified {
            user: recipient,
            actor: UserId::random(),
        })
        .await;
}
