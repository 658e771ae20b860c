//! Per-user notifications and their read state.
//!
//! A notification belongs to exactly one recipient and is either read or
//! unread. The unread count of a user is the number of their notifications
//! whose `read` flag is false; stores compute it rather than caching it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::content::ContentRef;
use super::{NotificationId, UserId};

/// Reason a notification was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    StatusChanged,
    NewComment,
    NewUpvote,
    AccountVerified,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StatusChanged => "STATUS_CHANGED",
            Self::NewComment => "NEW_COMMENT",
            Self::NewUpvote => "NEW_UPVOTE",
            Self::AccountVerified => "ACCOUNT_VERIFIED",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored kind is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown notification kind: {0}")]
pub struct UnknownNotificationKind(pub String);

impl FromStr for NotificationKind {
    type Err = UnknownNotificationKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "STATUS_CHANGED" => Ok(Self::StatusChanged),
            "NEW_COMMENT" => Ok(Self::NewComment),
            "NEW_UPVOTE" => Ok(Self::NewUpvote),
            "ACCOUNT_VERIFIED" => Ok(Self::AccountVerified),
            other => Err(UnknownNotificationKind(other.to_owned())),
        }
    }
}

/// Notification contents before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDraft {
    pub recipient: UserId,
    pub kind: NotificationKind,
    pub message: String,
    pub actor: Option<UserId>,
    pub target: Option<ContentRef>,
}

/// Stored notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient: UserId,
    pub kind: NotificationKind,
    pub message: String,
    pub actor: Option<UserId>,
    pub target: Option<ContentRef>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// An unread notification built from `draft`.
    pub fn from_draft(id: NotificationId, draft: NotificationDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            recipient: draft.recipient,
            kind: draft.kind,
            message: draft.message,
            actor: draft.actor,
            target: draft.target,
            read: false,
            created_at: now,
        }
    }
}

/// Result of a bulk mark-as-read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkAllReadOutcome {
    /// Rows flipped from unread to read.
    pub updated: u64,
    /// Unread count after the update.
    pub unread_count: u64,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(NotificationKind::StatusChanged)]
    #[case(NotificationKind::NewComment)]
    #[case(NotificationKind::NewUpvote)]
    #[case(NotificationKind::AccountVerified)]
    fn kind_parses_its_own_representation(#[case] kind: NotificationKind) {
        assert_eq!(kind.as_str().parse::<NotificationKind>(), Ok(kind));
    }

    #[rstest]
    fn unknown_kind_is_reported() {
        let err = "NEW_FOLLOWER"
            .parse::<NotificationKind>()
            .expect_err("unknown kind");
        assert_eq!(err.to_string(), "unknown notification kind: NEW_FOLLOWER");
    }

    #[rstest]
    fn drafts_become_unread_notifications() {
        let draft = NotificationDraft {
            recipient: UserId::random(),
            kind: NotificationKind::AccountVerified,
            message: "Your account has been verified.".to_owned(),
            actor: None,
            target: None,
        };
        let notification = Notification::from_draft(NotificationId::random(), draft, Utc::now());
        assert!(!notification.read);
    }
}
