//! Tests for report HTTP handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::domain::{Role, User};
use crate::domain::ports::NotificationRepository;
use crate::inbound::http::test_utils::{TestBackend, bearer};

#[fixture]
fn backend() -> TestBackend {
    TestBackend::new()
}

fn report_body(title: &str, municipality: &str) -> Value {
    json!({
        "title": title,
        "description": "The light at the junction has been out for a week.",
        "latitude": 27.7172,
        "longitude": 85.324,
        "municipality": municipality,
        "ward": "1",
        "photos": ["uploads/light.jpg"]
    })
}

async fn submit<S>(app: &S, token: &str, body: Value) -> ReportBody
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/report")
            .insert_header(bearer(token))
            .set_json(body)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    actix_test::read_body_json(response).await
}

#[rstest]
#[actix_web::test]
async fn create_requires_authentication(backend: TestBackend) {
    let app = actix_test::init_service(backend.app(routes)).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/report")
            .set_json(report_body("Broken street light", "Kathmandu"))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn created_report_is_pending_and_listed(backend: TestBackend) {
    let (citizen, token) = backend.seed_user(Role::User, "sita@example.com").await;
    let app = actix_test::init_service(backend.app(routes)).await;

    let created = submit(&app, &token, report_body("Broken street light", "Kathmandu")).await;
    assert_eq!(created.status, "PENDING");
    assert_eq!(created.author_id, citizen.id().to_string());
    assert_eq!(created.upvote_count, 0);
    assert_eq!(created.photos, vec!["uploads/light.jpg".to_owned()]);

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/report?municipality=kathmandu&status=pending")
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let listed: Vec<ReportBody> = actix_test::read_body_json(response).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);
}

#[rstest]
#[case(json!({"title": "ab", "description": "d", "latitude": 1.0, "longitude": 1.0, "municipality": "K", "ward": "1"}), "title")]
#[case(json!({"title": "Pothole", "description": "d", "latitude": 91.0, "longitude": 1.0, "municipality": "K", "ward": "1"}), "latitude")]
#[case(json!({"title": "Pothole", "description": "d", "latitude": 1.0, "longitude": 1.0, "municipality": " ", "ward": "1"}), "municipality")]
#[case(json!({"title": "Pothole", "description": "d", "latitude": 1.0, "longitude": 1.0, "municipality": "K", "ward": "1", "photos": ["1","2","3","4","5","6"]}), "photos")]
#[actix_web::test]
async fn invalid_reports_name_the_field(
    backend: TestBackend,
    #[case] body: Value,
    #[case] field: &str,
) {
    let (_, token) = backend.seed_user(Role::User, "sita@example.com").await;
    let app = actix_test::init_service(backend.app(routes)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/report")
            .insert_header(bearer(&token))
            .set_json(body)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: Value = actix_test::read_body_json(response).await;
    assert_eq!(error["code"], "invalid_request");
    assert_eq!(error["details"]["field"], field);
}

#[rstest]
#[actix_web::test]
async fn staff_status_change_notifies_the_author(backend: TestBackend) {
    let (citizen, citizen_token) = backend.seed_user(Role::User, "sita@example.com").await;
    let (_, staff_token) = backend
        .seed_user(Role::Municipality, "ward1@kathmandu.gov.np")
        .await;
    let app = actix_test::init_service(backend.app(routes)).await;
    let created = submit(
        &app,
        &citizen_token,
        report_body("Broken street light", "Kathmandu"),
    )
    .await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/report/{}/status", created.id))
            .insert_header(bearer(&staff_token))
            .set_json(json!({"status": "in_progress"}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let updated: ReportBody = actix_test::read_body_json(response).await;
    assert_eq!(updated.status, "IN_PROGRESS");
    let unread = backend
        .store
        .count_unread(citizen.id())
        .await
        .expect("count unread");
    assert_eq!(unread, 1);
}

async fn unread(backend: &TestBackend, user: &User) -> u64 {
    backend
        .store
        .count_unread(user.id())
        .await
        .expect("count unread")
}

#[rstest]
#[actix_web::test]
async fn opening_a_report_marks_its_notifications_read(backend: TestBackend) {
    let (citizen, citizen_token) = backend.seed_user(Role::User, "sita@example.com").await;
    let (_, staff_token) = backend
        .seed_user(Role::Municipality, "ward1@kathmandu.gov.np")
        .await;
    let app = actix_test::init_service(backend.app(routes)).await;
    let created = submit(
        &app,
        &citizen_token,
        report_body("Broken street light", "Kathmandu"),
    )
    .await;
    let status = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/report/{}/status", created.id))
            .insert_header(bearer(&staff_token))
            .set_json(json!({"status": "completed"}))
            .to_request(),
    )
    .await;
    assert_eq!(status.status(), StatusCode::OK);
    assert_eq!(unread(&backend, &citizen).await, 1);

    for token in [None, Some(&staff_token)] {
        let mut request =
            actix_test::TestRequest::get().uri(&format!("/api/report/{}", created.id));
        if let Some(token) = token {
            request = request.insert_header(bearer(token));
        }
        let response = actix_test::call_service(&app, request.to_request()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert_eq!(
        unread(&backend, &citizen).await,
        1,
        "other viewers leave the author's state"
    );

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/report/{}", created.id))
            .insert_header(bearer(&citizen_token))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(unread(&backend, &citizen).await, 0);
}

#[rstest]
#[case(Role::User, "other@example.com", StatusCode::FORBIDDEN)]
#[case(Role::Admin, "admin@communityfix.np", StatusCode::OK)]
#[actix_web::test]
async fn status_changes_are_staff_only(
    backend: TestBackend,
    #[case] role: Role,
    #[case] email: &str,
    #[case] expected: StatusCode,
) {
    let (_, citizen_token) = backend.seed_user(Role::User, "sita@example.com").await;
    let (_, caller_token) = backend.seed_user(role, email).await;
    let app = actix_test::init_service(backend.app(routes)).await;
    let created = submit(&app, &citizen_token, report_body("Pothole on ring road", "Lalitpur")).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/report/{}/status", created.id))
            .insert_header(bearer(&caller_token))
            .set_json(json!({"status": "COMPLETED"}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), expected);
}

#[rstest]
#[actix_web::test]
async fn unknown_status_is_rejected(backend: TestBackend) {
    let (_, token) = backend.seed_user(Role::Admin, "admin@communityfix.np").await;
    let app = actix_test::init_service(backend.app(routes)).await;
    let created = submit(&app, &token, report_body("Pothole on ring road", "Lalitpur")).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/report/{}/status", created.id))
            .insert_header(bearer(&token))
            .set_json(json!({"status": "ARCHIVED"}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn detail_is_public_and_reports_viewer_upvote(backend: TestBackend) {
    let (_, token) = backend.seed_user(Role::User, "sita@example.com").await;
    let app = actix_test::init_service(backend.app(routes)).await;
    let created = submit(&app, &token, report_body("Broken street light", "Kathmandu")).await;

    let anonymous = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/report/{}", created.id))
            .to_request(),
    )
    .await;
    assert_eq!(anonymous.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(anonymous).await;
    assert_eq!(body["hasUserUpvoted"], false);
    assert_eq!(body["title"], "Broken street light");

    let invalid_token = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/report/{}", created.id))
            .insert_header(bearer("garbage"))
            .to_request(),
    )
    .await;
    assert_eq!(invalid_token.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[case("not-a-uuid", StatusCode::BAD_REQUEST)]
#[case("3fa85f64-5717-4562-b3fc-2c963f66afa6", StatusCode::NOT_FOUND)]
#[actix_web::test]
async fn detail_lookup_failures(
    backend: TestBackend,
    #[case] id: &str,
    #[case] expected: StatusCode,
) {
    let app = actix_test::init_service(backend.app(routes)).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/report/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), expected);
}

#[rstest]
#[actix_web::test]
async fn only_the_author_deletes(backend: TestBackend) {
    let (_, author_token) = backend.seed_user(Role::User, "sita@example.com").await;
    let (_, stranger_token) = backend.seed_user(Role::User, "ram@example.com").await;
    let app = actix_test::init_service(backend.app(routes)).await;
    let created = submit(&app, &author_token, report_body("Broken street light", "Kathmandu")).await;
    let uri = format!("/api/report/{}", created.id);

    let forbidden = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&uri)
            .insert_header(bearer(&stranger_token))
            .to_request(),
    )
    .await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let deleted = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&uri)
            .insert_header(bearer(&author_token))
            .to_request(),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let gone = actix_test::call_service(&app, actix_test::TestRequest::get().uri(&uri).to_request())
        .await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}
