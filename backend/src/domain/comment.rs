//! Comments attached to reports and suggestions.

use chrono::{DateTime, Utc};

use super::content::{ContentRef, ContentValidationError, validate_text};
use super::{CommentId, UserId};

/// Maximum comment length in characters.
pub const COMMENT_MAX: usize = 1000;

/// Trimmed, non-empty comment text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentBody(String);

impl CommentBody {
    pub fn new(raw: &str) -> Result<Self, ContentValidationError> {
        validate_text("body", raw, 1, COMMENT_MAX).map(Self)
    }
}

impl AsRef<str> for CommentBody {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Stored comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub author: UserId,
    pub target: ContentRef,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        id: CommentId,
        author: UserId,
        target: ContentRef,
        body: CommentBody,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            author,
            target,
            body: body.0,
            created_at: now,
        }
    }
}
