//! Comment HTTP handlers.
//!
//! ```text
//! POST   /api/comment                          {"targetType":"report","targetId":"…","body":"…"}
//! GET    /api/comment/{targetType}/{targetId}
//! DELETE /api/comment/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Comment, CommentBody, CommentId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::content::content_error;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_content_ref, parse_uuid};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentBody {
    #[schema(example = "report")]
    pub target_type: String,
    #[schema(format = "uuid")]
    pub target_id: String,
    pub body: String,
}

/// Comment as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponseBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub author_id: String,
    pub target_type: String,
    #[schema(format = "uuid")]
    pub target_id: String,
    pub body: String,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<Comment> for CommentResponseBody {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id.to_string(),
            author_id: comment.author.to_string(),
            target_type: comment.target.kind().as_str().to_owned(),
            target_id: comment.target.id().to_string(),
            body: comment.body,
            created_at: comment.created_at.to_rfc3339(),
        }
    }
}

/// Comment on a report or suggestion.
#[utoipa::path(
    post,
    path = "/api/comment",
    request_body = CreateCommentBody,
    responses(
        (status = 201, description = "Comment added", body = CommentResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Target not found", body = ErrorSchema)
    ),
    tags = ["comments"],
    operation_id = "addComment",
    security(("BearerAuth" = []))
)]
#[post("")]
pub async fn add_comment(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<CreateCommentBody>,
) -> ApiResult<HttpResponse> {
    let target = parse_content_ref(&payload.target_type, &payload.target_id)?;
    let body = CommentBody::new(&payload.body).map_err(content_error)?;
    let comment = state
        .comments
        .add_comment(caller.actor(), target, body)
        .await?;
    Ok(HttpResponse::Created().json(CommentResponseBody::from(comment)))
}

/// List comments on a report or suggestion, oldest first.
#[utoipa::path(
    get,
    path = "/api/comment/{targetType}/{targetId}",
    params(
        ("targetType" = String, Path, description = "`report` or `suggestion`"),
        ("targetId" = String, Path, description = "Target identifier")
    ),
    responses(
        (status = 200, description = "Comments", body = [CommentResponseBody]),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["comments"],
    operation_id = "listComments",
    security([])
)]
#[get("/{target_type}/{target_id}")]
pub async fn list_comments(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Vec<CommentResponseBody>>> {
    let (kind, id) = path.into_inner();
    let target = parse_content_ref(&kind, &id)?;
    let comments = state.comments_query.list_comments(target).await?;
    Ok(web::Json(
        comments.into_iter().map(CommentResponseBody::from).collect(),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/comment/{id}",
    params(("id" = String, Path, description = "Comment identifier")),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 403, description = "Not the author or an administrator", body = ErrorSchema),
        (status = 404, description = "Comment not found", body = ErrorSchema)
    ),
    tags = ["comments"],
    operation_id = "deleteComment",
    security(("BearerAuth" = []))
)]
#[delete("/{id}")]
pub async fn delete_comment(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(&path, FieldName::new("id")).map(CommentId::from_uuid)?;
    state.comments.delete_comment(caller.actor(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/comment")
            .service(add_comment)
            .service(list_comments)
            .service(delete_comment),
    );
}
