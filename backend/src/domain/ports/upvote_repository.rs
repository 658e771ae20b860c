//! Port for upvote persistence.
//!
//! The toggle is a single atomic operation: adapters must not let two
//! concurrent toggles by the same user leave duplicate rows or a count that
//! disagrees with the rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ContentRef, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by upvote repository adapters.
    pub enum UpvoteRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String }
            => "upvote repository connection failed: {message}" as unavailable,
        /// Query or mutation failed during execution.
        Query { message: String } => "upvote repository query failed: {message}" as internal,
        /// The report or suggestion does not exist.
        TargetNotFound { target: String } => "upvote target not found: {target}",
    }
}

/// Upvote count of a target and whether the caller has upvoted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpvoteState {
    pub count: u32,
    pub has_upvoted: bool,
}

/// Result of toggling an upvote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpvoteToggle {
    pub state: UpvoteState,
    /// True when the toggle added an upvote, false when it removed one.
    pub added: bool,
    pub target_author: UserId,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpvoteRepository: Send + Sync {
    /// Add the user's upvote if absent, remove it otherwise.
    ///
    /// `at` stamps a newly added upvote row.
    async fn toggle(
        &self,
        user: &UserId,
        target: &ContentRef,
        at: DateTime<Utc>,
    ) -> Result<UpvoteToggle, UpvoteRepositoryError>;

    /// Read the current state without mutating it.
    async fn status(
        &self,
        user: &UserId,
        target: &ContentRef,
    ) -> Result<UpvoteState, UpvoteRepositoryError>;
}
