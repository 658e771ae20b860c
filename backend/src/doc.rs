//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer
//! - **Schemas**: request/response bodies plus the domain error wrappers
//!   ([`ErrorSchema`], [`ErrorCodeSchema`]) that keep utoipa out of the domain
//! - **Security**: HS256 bearer token authentication scheme
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::accounts::{
    AuthResponseBody, LoginRequestBody, MunicipalityAccountBody, ProfileUpdateBody,
    RegisterRequestBody, UserBody,
};
use crate::inbound::http::comments::{CommentResponseBody, CreateCommentBody};
use crate::inbound::http::content::StatusUpdateBody;
use crate::inbound::http::notifications::{
    MarkAllReadBody, NotificationBody, NotificationMutationBody, UnreadCountBody,
};
use crate::inbound::http::reports::{CreateReportBody, ReportBody, ReportDetailBody};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::suggestions::{
    CreateSuggestionBody, SuggestionBody, SuggestionDetailBody,
};
use crate::inbound::http::upvotes::UpvoteStateBody;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let mut bearer = Http::new(HttpAuthScheme::Bearer);
        bearer.bearer_format = Some("JWT".to_owned());
        bearer.description = Some("Token issued by POST /api/auth/login.".to_owned());
        components.add_security_scheme("BearerAuth", SecurityScheme::Http(bearer));
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "CommunityFix backend API",
        description = "Civic issue reports, suggestions, comments, upvotes and notifications."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::me,
        crate::inbound::http::accounts::update_profile,
        crate::inbound::http::accounts::list_users,
        crate::inbound::http::accounts::verify_user,
        crate::inbound::http::accounts::delete_user,
        crate::inbound::http::accounts::create_municipality_account,
        crate::inbound::http::reports::create_report,
        crate::inbound::http::reports::list_reports,
        crate::inbound::http::reports::get_report,
        crate::inbound::http::reports::update_report_status,
        crate::inbound::http::reports::delete_report,
        crate::inbound::http::suggestions::create_suggestion,
        crate::inbound::http::suggestions::list_suggestions,
        crate::inbound::http::suggestions::get_suggestion,
        crate::inbound::http::suggestions::update_suggestion_status,
        crate::inbound::http::suggestions::delete_suggestion,
        crate::inbound::http::comments::add_comment,
        crate::inbound::http::comments::list_comments,
        crate::inbound::http::comments::delete_comment,
        crate::inbound::http::upvotes::toggle_upvote,
        crate::inbound::http::upvotes::upvote_status,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::unread_count,
        crate::inbound::http::notifications::mark_read,
        crate::inbound::http::notifications::mark_all_read,
        crate::inbound::http::notifications::delete_notification,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RegisterRequestBody,
        LoginRequestBody,
        ProfileUpdateBody,
        MunicipalityAccountBody,
        UserBody,
        AuthResponseBody,
        CreateReportBody,
        ReportBody,
        ReportDetailBody,
        CreateSuggestionBody,
        SuggestionBody,
        SuggestionDetailBody,
        StatusUpdateBody,
        CreateCommentBody,
        CommentResponseBody,
        UpvoteStateBody,
        NotificationBody,
        UnreadCountBody,
        NotificationMutationBody,
        MarkAllReadBody,
    )),
    tags(
        (name = "auth", description = "Registration, login, profiles and account administration"),
        (name = "reports", description = "Civic issue reports"),
        (name = "suggestions", description = "Improvement suggestions"),
        (name = "comments", description = "Comments on reports and suggestions"),
        (name = "upvotes", description = "Upvote toggles"),
        (name = "notifications", description = "Notification history and read state"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
