//! Tests for notification HTTP handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::{fixture, rstest};
use serde_json::Value;

use super::*;
use crate::domain::ports::MockNotificationPush;
use crate::domain::{NotificationDraft, NotificationKind, Role, User, UserId};
use crate::inbound::http::test_utils::{TestBackend, bearer};

#[fixture]
fn backend() -> TestBackend {
    TestBackend::new()
}

fn draft(recipient: &UserId, message: &str) -> NotificationDraft {
    NotificationDraft {
        recipient: recipient.clone(),
        kind: NotificationKind::NewComment,
        message: message.to_owned(),
        actor: Some(UserId::random()),
        target: None,
    }
}

async fn seed_notifications(backend: &TestBackend, user: &User, count: usize) -> Vec<Notification> {
    let mut created = Vec::with_capacity(count);
    for index in 0..count {
        let notification = backend
            .state
            .notifications
            .create_notification(draft(user.id(), &format!("message {index}")))
            .await
            .expect("create notification");
        created.push(notification);
    }
    created
}

#[rstest]
#[actix_web::test]
async fn listing_is_scoped_to_the_caller(backend: TestBackend) {
    let (sita, sita_token) = backend.seed_user(Role::User, "sita@example.com").await;
    let (ram, _) = backend.seed_user(Role::User, "ram@example.com").await;
    seed_notifications(&backend, &sita, 2).await;
    seed_notifications(&backend, &ram, 3).await;
    let app = actix_test::init_service(backend.app(routes)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/notification")
            .insert_header(bearer(&sita_token))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let listed: Vec<NotificationBody> = actix_test::read_body_json(response).await;
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|n| !n.is_read && n.kind == "NEW_COMMENT"));
}

#[rstest]
#[actix_web::test]
async fn listing_honours_the_page_size(backend: TestBackend) {
    let (sita, token) = backend.seed_user(Role::User, "sita@example.com").await;
    seed_notifications(&backend, &sita, 3).await;
    let app = actix_test::init_service(backend.app(routes)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/notification?limit=2&offset=0")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    let listed: Vec<NotificationBody> = actix_test::read_body_json(response).await;
    assert_eq!(listed.len(), 2);

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/notification?limit=500")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn unread_count_follows_mark_read(backend: TestBackend) {
    let (sita, token) = backend.seed_user(Role::User, "sita@example.com").await;
    let created = seed_notifications(&backend, &sita, 2).await;
    let app = actix_test::init_service(backend.app(routes)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/notification/unread-count")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    let count: UnreadCountBody = actix_test::read_body_json(response).await;
    assert_eq!(count.count, 2);

    let uri = format!("/api/notification/{}/read", created[0].id);
    for expected in [1, 1] {
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&uri)
                .insert_header(bearer(&token))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: NotificationMutationBody = actix_test::read_body_json(response).await;
        assert_eq!(body.unread_count, expected);
    }
}

#[rstest]
#[actix_web::test]
async fn marking_someone_elses_notification_changes_nothing(backend: TestBackend) {
    let (sita, _) = backend.seed_user(Role::User, "sita@example.com").await;
    let (_, ram_token) = backend.seed_user(Role::User, "ram@example.com").await;
    let created = seed_notifications(&backend, &sita, 1).await;
    let app = actix_test::init_service(backend.app(routes)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/notification/{}/read", created[0].id))
            .insert_header(bearer(&ram_token))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: NotificationMutationBody = actix_test::read_body_json(response).await;
    assert_eq!(body.unread_count, 0);
    let still_unread = backend
        .state
        .notifications_query
        .unread_count(sita.id())
        .await
        .expect("count");
    assert_eq!(still_unread, 1);
}

#[rstest]
#[actix_web::test]
async fn mark_all_read_reports_updated_rows(backend: TestBackend) {
    let (sita, token) = backend.seed_user(Role::User, "sita@example.com").await;
    seed_notifications(&backend, &sita, 3).await;
    let app = actix_test::init_service(backend.app(routes)).await;

    let mut outcomes = Vec::new();
    for _ in 0..2 {
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri("/api/notification/read-all")
                .insert_header(bearer(&token))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: MarkAllReadBody = actix_test::read_body_json(response).await;
        outcomes.push((body.updated, body.unread_count));
    }

    assert_eq!(outcomes, vec![(3, 0), (0, 0)]);
}

#[rstest]
#[actix_web::test]
async fn delete_returns_the_new_count_and_then_not_found(backend: TestBackend) {
    let (sita, token) = backend.seed_user(Role::User, "sita@example.com").await;
    let created = seed_notifications(&backend, &sita, 2).await;
    let app = actix_test::init_service(backend.app(routes)).await;
    let uri = format!("/api/notification/{}", created[1].id);

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&uri)
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: NotificationMutationBody = actix_test::read_body_json(response).await;
    assert_eq!(body.unread_count, 1);

    let listed: Vec<NotificationBody> = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/notification")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    let ids: Vec<String> = listed.into_iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![created[0].id.to_string()]);

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&uri)
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: Value = actix_test::read_body_json(response).await;
    assert_eq!(error["error"], "Notification not found.");
}

#[rstest]
#[actix_web::test]
async fn mutations_push_the_fresh_count() {
    let mut push = MockNotificationPush::new();
    push.expect_push_notification().returning(|_, _| Ok(0));
    push.expect_push_unread_count()
        .withf(|_, count| *count == 0)
        .times(1)
        .returning(|_, _| Ok(1));
    let backend = TestBackend::with_push(Arc::new(push));
    let (sita, token) = backend.seed_user(Role::User, "sita@example.com").await;
    let created = seed_notifications(&backend, &sita, 1).await;
    let app = actix_test::init_service(backend.app(routes)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/notification/{}/read", created[0].id))
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[rstest]
#[case("/api/notification")]
#[case("/api/notification/unread-count")]
#[actix_web::test]
async fn endpoints_require_authentication(backend: TestBackend, #[case] uri: &str) {
    let app = actix_test::init_service(backend.app(routes)).await;
    let response =
        actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
