//! Suggestion HTTP handlers.
//!
//! Same surface as reports under `/api/suggestion`, with a free-form
//! category in place of location and photos.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    ContentRef, Error, Jurisdiction, NewSuggestion, Suggestion, SuggestionDetail, SuggestionId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{Authenticated, MaybeAuthenticated};
use crate::inbound::http::content::{
    ContentListQuery, StatusUpdateBody, content_error, mark_opened, parse_status,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Payload for `POST /api/suggestion`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSuggestionBody {
    pub title: String,
    pub description: String,
    #[schema(example = "transport")]
    pub category: String,
    pub municipality: String,
    pub ward: String,
}

/// Suggestion as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub author_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    #[schema(example = "PENDING")]
    pub status: String,
    pub municipality: String,
    pub ward: String,
    pub upvote_count: u32,
    pub comment_count: u32,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<Suggestion> for SuggestionBody {
    fn from(suggestion: Suggestion) -> Self {
        Self {
            id: suggestion.id.to_string(),
            author_id: suggestion.author.to_string(),
            title: suggestion.title,
            description: suggestion.description,
            category: suggestion.category,
            status: suggestion.status.as_str().to_owned(),
            municipality: suggestion.jurisdiction.municipality().to_owned(),
            ward: suggestion.jurisdiction.ward().to_owned(),
            upvote_count: suggestion.upvote_count,
            comment_count: suggestion.comment_count,
            created_at: suggestion.created_at.to_rfc3339(),
            updated_at: suggestion.updated_at.to_rfc3339(),
        }
    }
}

/// Single suggestion with the caller's upvote state.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionDetailBody {
    #[serde(flatten)]
    pub suggestion: SuggestionBody,
    pub has_user_upvoted: bool,
}

impl From<SuggestionDetail> for SuggestionDetailBody {
    fn from(detail: SuggestionDetail) -> Self {
        Self {
            suggestion: SuggestionBody::from(detail.suggestion),
            has_user_upvoted: detail.has_user_upvoted,
        }
    }
}

fn parse_new_suggestion(body: &CreateSuggestionBody) -> Result<NewSuggestion, Error> {
    let jurisdiction = Jurisdiction::new(&body.municipality, &body.ward).map_err(content_error)?;
    NewSuggestion::new(&body.title, &body.description, &body.category, jurisdiction)
        .map_err(content_error)
}

fn parse_suggestion_id(raw: &str) -> Result<SuggestionId, Error> {
    parse_uuid(raw, FieldName::new("id")).map(SuggestionId::from_uuid)
}

/// Propose an improvement.
#[utoipa::path(
    post,
    path = "/api/suggestion",
    request_body = CreateSuggestionBody,
    responses(
        (status = 201, description = "Suggestion created", body = SuggestionBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["suggestions"],
    operation_id = "createSuggestion",
    security(("BearerAuth" = []))
)]
#[post("")]
pub async fn create_suggestion(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<CreateSuggestionBody>,
) -> ApiResult<HttpResponse> {
    let input = parse_new_suggestion(&payload)?;
    let suggestion = state
        .suggestions
        .create_suggestion(caller.actor(), input)
        .await?;
    Ok(HttpResponse::Created().json(SuggestionBody::from(suggestion)))
}

/// List suggestions.
#[utoipa::path(
    get,
    path = "/api/suggestion",
    params(ContentListQuery),
    responses(
        (status = 200, description = "Suggestions", body = [SuggestionBody]),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["suggestions"],
    operation_id = "listSuggestions",
    security([])
)]
#[get("")]
pub async fn list_suggestions(
    state: web::Data<HttpState>,
    query: web::Query<ContentListQuery>,
) -> ApiResult<web::Json<Vec<SuggestionBody>>> {
    let filter = query.into_inner().into_filter()?;
    let suggestions = state.suggestions_query.list_suggestions(filter).await?;
    Ok(web::Json(
        suggestions.into_iter().map(SuggestionBody::from).collect(),
    ))
}

/// Fetch one suggestion.
#[utoipa::path(
    get,
    path = "/api/suggestion/{id}",
    params(("id" = String, Path, description = "Suggestion identifier")),
    responses(
        (status = 200, description = "Suggestion", body = SuggestionDetailBody),
        (status = 404, description = "Suggestion not found", body = ErrorSchema)
    ),
    tags = ["suggestions"],
    operation_id = "getSuggestion",
    security([], ("BearerAuth" = []))
)]
#[get("/{id}")]
pub async fn get_suggestion(
    state: web::Data<HttpState>,
    caller: MaybeAuthenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<SuggestionDetailBody>> {
    let id = parse_suggestion_id(&path)?;
    let viewer = caller.0.map(|actor| actor.id);
    let detail = state.suggestions_query.get_suggestion(viewer.clone(), id).await?;
    mark_opened(&state, viewer.as_ref(), ContentRef::Suggestion(id)).await;
    Ok(web::Json(SuggestionDetailBody::from(detail)))
}

/// Move a suggestion through the workflow.
#[utoipa::path(
    patch,
    path = "/api/suggestion/{id}/status",
    params(("id" = String, Path, description = "Suggestion identifier")),
    request_body = StatusUpdateBody,
    responses(
        (status = 200, description = "Updated suggestion", body = SuggestionBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not staff for this municipality", body = ErrorSchema),
        (status = 404, description = "Suggestion not found", body = ErrorSchema)
    ),
    tags = ["suggestions"],
    operation_id = "updateSuggestionStatus",
    security(("BearerAuth" = []))
)]
#[patch("/{id}/status")]
pub async fn update_suggestion_status(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<StatusUpdateBody>,
) -> ApiResult<web::Json<SuggestionBody>> {
    let id = parse_suggestion_id(&path)?;
    let status = parse_status(&payload)?;
    let suggestion = state
        .suggestions
        .update_suggestion_status(caller.actor(), id, status)
        .await?;
    Ok(web::Json(SuggestionBody::from(suggestion)))
}

#[utoipa::path(
    delete,
    path = "/api/suggestion/{id}",
    params(("id" = String, Path, description = "Suggestion identifier")),
    responses(
        (status = 204, description = "Suggestion deleted"),
        (status = 403, description = "Not the author or an administrator", body = ErrorSchema),
        (status = 404, description = "Suggestion not found", body = ErrorSchema)
    ),
    tags = ["suggestions"],
    operation_id = "deleteSuggestion",
    security(("BearerAuth" = []))
)]
#[delete("/{id}")]
pub async fn delete_suggestion(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_suggestion_id(&path)?;
    state.suggestions.delete_suggestion(caller.actor(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/suggestion")
            .service(create_suggestion)
            .service(list_suggestions)
            .service(get_suggestion)
            .service(update_suggestion_status)
            .service(delete_suggestion),
    );
}
