//! Notification HTTP handlers.
//!
//! These endpoints are the polling fallback for clients without a live
//! socket and the authoritative source after a reconnect. Every mutation
//! answers with the recipient's fresh unread count so badge state never
//! needs a second round trip.
//!
//! ```text
//! GET    /api/notification?limit=20&offset=0
//! GET    /api/notification/unread-count
//! PATCH  /api/notification/{id}/read
//! PATCH  /api/notification/read-all
//! DELETE /api/notification/{id}
//! ```

use actix_web::{delete, get, patch, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, Notification, NotificationId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::content::parse_page;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Pagination for the notification listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct NotificationListQuery {
    /// Page size, 1 to 100 (default 20).
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Notification as returned by the API and pushed over the socket.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(example = "STATUS_CHANGED")]
    pub kind: String,
    pub message: String,
    #[schema(format = "uuid")]
    pub actor_id: Option<String>,
    #[schema(example = "report")]
    pub target_type: Option<String>,
    #[schema(format = "uuid")]
    pub target_id: Option<String>,
    pub is_read: bool,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<&Notification> for NotificationBody {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id.to_string(),
            kind: notification.kind.as_str().to_owned(),
            message: notification.message.clone(),
            actor_id: notification.actor.as_ref().map(ToString::to_string),
            target_type: notification
                .target
                .map(|target| target.kind().as_str().to_owned()),
            target_id: notification.target.map(|target| target.id().to_string()),
            is_read: notification.read,
            created_at: notification.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountBody {
    pub count: u64,
}

/// Unread count after a single-notification mutation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationMutationBody {
    pub unread_count: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadBody {
    /// Notifications flipped from unread to read.
    pub updated: u64,
    pub unread_count: u64,
}

fn parse_notification_id(raw: &str) -> Result<NotificationId, Error> {
    parse_uuid(raw, FieldName::new("id")).map(NotificationId::from_uuid)
}

/// List the caller's notifications, newest first.
#[utoipa::path(
    get,
    path = "/api/notification",
    params(NotificationListQuery),
    responses(
        (status = 200, description = "Notifications", body = [NotificationBody]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications",
    security(("BearerAuth" = []))
)]
#[get("")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    caller: Authenticated,
    query: web::Query<NotificationListQuery>,
) -> ApiResult<web::Json<Vec<NotificationBody>>> {
    let page = parse_page(query.limit.as_deref(), query.offset.as_deref())?;
    let notifications = state
        .notifications_query
        .list_notifications(&caller.actor().id, page)
        .await?;
    Ok(web::Json(
        notifications.iter().map(NotificationBody::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/notification/unread-count",
    responses(
        (status = 200, description = "Unread notifications", body = UnreadCountBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "unreadNotificationCount",
    security(("BearerAuth" = []))
)]
#[get("/unread-count")]
pub async fn unread_count(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<UnreadCountBody>> {
    let count = state
        .notifications_query
        .unread_count(&caller.actor().id)
        .await?;
    Ok(web::Json(UnreadCountBody { count }))
}

/// Mark one notification read. Unknown, foreign or already read ids leave
/// state unchanged.
#[utoipa::path(
    patch,
    path = "/api/notification/{id}/read",
    params(("id" = String, Path, description = "Notification identifier")),
    responses(
        (status = 200, description = "Unread count after the update", body = NotificationMutationBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "markNotificationRead",
    security(("BearerAuth" = []))
)]
#[patch("/{id}/read")]
pub async fn mark_read(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<NotificationMutationBody>> {
    let id = parse_notification_id(&path)?;
    let count = state
        .notifications
        .mark_read(&caller.actor().id, id)
        .await?;
    Ok(web::Json(NotificationMutationBody {
        unread_count: count,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/notification/read-all",
    responses(
        (status = 200, description = "Bulk update outcome", body = MarkAllReadBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "markAllNotificationsRead",
    security(("BearerAuth" = []))
)]
#[patch("/read-all")]
pub async fn mark_all_read(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<MarkAllReadBody>> {
    let outcome = state
        .notifications
        .mark_all_read(&caller.actor().id)
        .await?;
    Ok(web::Json(MarkAllReadBody {
        updated: outcome.updated,
        unread_count: outcome.unread_count,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/notification/{id}",
    params(("id" = String, Path, description = "Notification identifier")),
    responses(
        (status = 200, description = "Unread count after the delete", body = NotificationMutationBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Notification not found", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "deleteNotification",
    security(("BearerAuth" = []))
)]
#[delete("/{id}")]
pub async fn delete_notification(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<NotificationMutationBody>> {
    let id = parse_notification_id(&path)?;
    let count = state
        .notifications
        .delete_notification(&caller.actor().id, id)
        .await?;
    Ok(web::Json(NotificationMutationBody {
        unread_count: count,
    }))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notification")
            .service(list_notifications)
            .service(unread_count)
            .service(mark_all_read)
            .service(mark_read)
            .service(delete_notification),
    );
}

#[cfg(test)]
#[path = "notifications_tests.rs"]
mod tests;
