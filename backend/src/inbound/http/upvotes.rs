//! Upvote HTTP handlers.
//!
//! `POST /api/upvote/{targetType}/{targetId}` toggles the caller's upvote;
//! `GET` on the same path reports the current state without changing it.

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::UpvoteState;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_content_ref;

/// Upvote count and whether the caller is among the upvoters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpvoteStateBody {
    pub count: u32,
    pub has_upvoted: bool,
}

impl From<UpvoteState> for UpvoteStateBody {
    fn from(state: UpvoteState) -> Self {
        Self {
            count: state.count,
            has_upvoted: state.has_upvoted,
        }
    }
}

/// Add the caller's upvote, or remove it if already present.
#[utoipa::path(
    post,
    path = "/api/upvote/{targetType}/{targetId}",
    params(
        ("targetType" = String, Path, description = "`report` or `suggestion`"),
        ("targetId" = String, Path, description = "Target identifier")
    ),
    responses(
        (status = 200, description = "State after the toggle", body = UpvoteStateBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Target not found", body = ErrorSchema)
    ),
    tags = ["upvotes"],
    operation_id = "toggleUpvote",
    security(("BearerAuth" = []))
)]
#[post("/{target_type}/{target_id}")]
pub async fn toggle_upvote(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<UpvoteStateBody>> {
    let (kind, id) = path.into_inner();
    let target = parse_content_ref(&kind, &id)?;
    let outcome = state.upvotes.toggle_upvote(caller.actor(), target).await?;
    Ok(web::Json(outcome.into()))
}

#[utoipa::path(
    get,
    path = "/api/upvote/{targetType}/{targetId}",
    params(
        ("targetType" = String, Path, description = "`report` or `suggestion`"),
        ("targetId" = String, Path, description = "Target identifier")
    ),
    responses(
        (status = 200, description = "Current state", body = UpvoteStateBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Target not found", body = ErrorSchema)
    ),
    tags = ["upvotes"],
    operation_id = "upvoteStatus",
    security(("BearerAuth" = []))
)]
#[get("/{target_type}/{target_id}")]
pub async fn upvote_status(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<UpvoteStateBody>> {
    let (kind, id) = path.into_inner();
    let target = parse_content_ref(&kind, &id)?;
    let current = state.upvotes.upvote_status(caller.actor(), target).await?;
    Ok(web::Json(current.into()))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/upvote")
            .service(toggle_upvote)
            .service(upvote_status),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ports::{NotificationRepository, SuggestionRepository};
    use crate::domain::{Jurisdiction, NewSuggestion, Role, Suggestion, SuggestionId, UserId};
    use crate::inbound::http::test_utils::{TestBackend, bearer};
    use crate::test_support::fixture_timestamp;

    #[fixture]
    fn backend() -> TestBackend {
        TestBackend::new()
    }

    async fn seed_suggestion(backend: &TestBackend, author: &UserId) -> SuggestionId {
        let input = NewSuggestion::new(
            "More benches",
            "Add seating along the river walk.",
            "parks",
            Jurisdiction::new("Pokhara", "6").expect("jurisdiction"),
        )
        .expect("valid suggestion");
        let suggestion =
            Suggestion::submit(SuggestionId::random(), author.clone(), input, fixture_timestamp());
        SuggestionRepository::insert(backend.store.as_ref(), &suggestion)
            .await
            .expect("seed suggestion");
        suggestion.id
    }

    #[rstest]
    #[actix_web::test]
    async fn toggling_twice_restores_the_count(backend: TestBackend) {
        let (author, _) = backend.seed_user(Role::User, "sita@example.com").await;
        let (_, voter_token) = backend.seed_user(Role::User, "ram@example.com").await;
        let suggestion = seed_suggestion(&backend, author.id()).await;
        let app = actix_test::init_service(backend.app(routes)).await;
        let uri = format!("/api/upvote/suggestion/{suggestion}");

        let mut states = Vec::new();
        for _ in 0..2 {
            let response = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri(&uri)
                    .insert_header(bearer(&voter_token))
                    .to_request(),
            )
            .await;
            assert_eq!(response.status(), StatusCode::OK);
            let state: UpvoteStateBody = actix_test::read_body_json(response).await;
            states.push((state.count, state.has_upvoted));
        }
        assert_eq!(states, vec![(1, true), (0, false)]);

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&uri)
                .insert_header(bearer(&voter_token))
                .to_request(),
        )
        .await;
        let current: UpvoteStateBody = actix_test::read_body_json(response).await;
        assert_eq!((current.count, current.has_upvoted), (0, false));

        // Only the first toggle added an upvote.
        let unread = backend
            .store
            .count_unread(author.id())
            .await
            .expect("count unread");
        assert_eq!(unread, 1);
    }

    #[rstest]
    #[actix_web::test]
    async fn upvoting_own_content_does_not_notify(backend: TestBackend) {
        let (author, token) = backend.seed_user(Role::User, "sita@example.com").await;
        let suggestion = seed_suggestion(&backend, author.id()).await;
        let app = actix_test::init_service(backend.app(routes)).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/upvote/suggestion/{suggestion}"))
                .insert_header(bearer(&token))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let unread = backend
            .store
            .count_unread(author.id())
            .await
            .expect("count unread");
        assert_eq!(unread, 0);
    }

    #[rstest]
    #[case("report/3fa85f64-5717-4562-b3fc-2c963f66afa6", StatusCode::NOT_FOUND)]
    #[case("report/nope", StatusCode::BAD_REQUEST)]
    #[case("walk/3fa85f64-5717-4562-b3fc-2c963f66afa6", StatusCode::BAD_REQUEST)]
    #[actix_web::test]
    async fn toggle_failures(
        backend: TestBackend,
        #[case] target: &str,
        #[case] expected: StatusCode,
    ) {
        let (_, token) = backend.seed_user(Role::User, "ram@example.com").await;
        let app = actix_test::init_service(backend.app(routes)).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/upvote/{target}"))
                .insert_header(bearer(&token))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn anonymous_toggle_is_unauthorised(backend: TestBackend) {
        let app = actix_test::init_service(backend.app(routes)).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/upvote/report/3fa85f64-5717-4562-b3fc-2c963f66afa6")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
