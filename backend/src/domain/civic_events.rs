//! Domain events raised by civic content changes.
//!
//! Services publish a [`CivicEvent`] after a successful mutation; the
//! notification service turns it into at most one notification for the
//! owner of the affected content.

use super::content::{ContentRef, ContentStatus};
use super::notification::{NotificationDraft, NotificationKind};
use super::UserId;

/// Something happened that the content owner may want to hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CivicEvent {
    ReportStatusChanged {
        report: ContentRef,
        title: String,
        author: UserId,
        actor: UserId,
        from: ContentStatus,
        to: ContentStatus,
    },
    SuggestionStatusChanged {
        suggestion: ContentRef,
        title: String,
        author: UserId,
        actor: UserId,
        from: ContentStatus,
        to: ContentStatus,
    },
    CommentAdded {
        target: ContentRef,
        target_author: UserId,
        actor: UserId,
        actor_name: String,
    },
    UpvoteAdded {
        target: ContentRef,
        target_author: UserId,
        actor: UserId,
    },
    AccountVerified {
        user: UserId,
        actor: UserId,
    },
}

impl CivicEvent {
    /// Name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReportStatusChanged { .. } => "report_status_changed",
            Self::SuggestionStatusChanged { .. } => "suggestion_status_changed",
            Self::CommentAdded { .. } => "comment_added",
            Self::UpvoteAdded { .. } => "upvote_added",
            Self::AccountVerified { .. } => "account_verified",
        }
    }

    /// The notification this event produces, if any.
    ///
    /// Returns `None` when the actor is the recipient, or when a status
    /// change did not actually change the status.
    pub fn into_notification(self) -> Option<NotificationDraft> {
        let (recipient, actor, kind, message, target) = match self {
            Self::ReportStatusChanged {
                report,
                title,
                author,
                actor,
                from,
                to,
            } => {
                if from == to {
                    return None;
                }
                let message = format!("Your report \"{title}\" is now {}.", to.label());
                (author, actor, NotificationKind::StatusChanged, message, Some(report))
            }
            Self::SuggestionStatusChanged {
                suggestion,
                title,
                author,
                actor,
                from,
                to,
            } => {
                if from == to {
                    return None;
                }
                let message = format!("Your suggestion \"{title}\" is now {}.", to.label());
                (author, actor, NotificationKind::StatusChanged, message, Some(suggestion))
            }
            Self::CommentAdded {
                target,
                target_author,
                actor,
                actor_name,
            } => {
                let message = format!(
                    "{actor_name} commented on your {}.",
                    target.kind().as_str()
                );
                (target_author, actor, NotificationKind::NewComment, message, Some(target))
            }
            Self::UpvoteAdded {
                target,
                target_author,
                actor,
            } => {
                let message = format!("Someone upvoted your {}.", target.kind().as_str());
                (target_author, actor, NotificationKind::NewUpvote, message, Some(target))
            }
            Self::AccountVerified { user, actor } => (
                user,
                actor,
                NotificationKind::AccountVerified,
                "Your account has been verified.".to_owned(),
                None,
            ),
        };

        if recipient == actor {
            return None;
        }

        Some(NotificationDraft {
            recipient,
            kind,
            message,
            actor: Some(actor),
            target,
        })
    }
}
