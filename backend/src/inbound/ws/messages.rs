//! Wire-level frames exchanged over the notification socket.
//!
//! Every frame is a JSON object `{"event": "<name>", "data": <payload>}`.
//! The server emits `new_notification`, `unread_count` and `error`; clients
//! send `mark_notification_read` and `mark_all_read`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Error, Notification};
use crate::inbound::http::notifications::NotificationBody;

/// Frame pushed from the server to a client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A notification was just created for the connected user.
    NewNotification(NotificationBody),
    /// The connected user's unread count changed.
    UnreadCount { count: u64 },
    /// A client frame could not be processed.
    Error(ErrorPayload),
}

impl ServerEvent {
    pub fn new_notification(notification: &Notification) -> Self {
        Self::NewNotification(NotificationBody::from(notification))
    }

    pub fn unread_count(count: u64) -> Self {
        Self::UnreadCount { count }
    }

    /// JSON text of the frame.
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Body of an `error` frame; mirrors the REST error envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub code: String,
    pub error: String,
    /// Event name of the rejected frame, when it could be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
}

impl ErrorPayload {
    pub fn invalid_frame(message: impl Into<String>) -> Self {
        Self {
            code: "invalid_request".to_owned(),
            error: message.into(),
            event: None,
        }
    }

    pub fn from_domain(event: &'static str, error: &Error) -> Self {
        let code = serde_json::to_value(error.code())
            .ok()
            .and_then(|value| value.as_str().map(str::to_owned))
            .unwrap_or_else(|| "internal_error".to_owned());
        Self {
            code,
            error: error.message().to_owned(),
            event: Some(event.to_owned()),
        }
    }
}

/// Frame sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    MarkNotificationRead {
        #[serde(rename = "notificationId", alias = "notification_id")]
        notification_id: Uuid,
    },
    MarkAllRead,
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MarkNotificationRead { .. } => "mark_notification_read",
            Self::MarkAllRead => "mark_all_read",
        }
    }
}
