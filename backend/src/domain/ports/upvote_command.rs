//! Driving port for upvotes.

use async_trait::async_trait;

use crate::domain::{Actor, ContentRef, Error};

use super::UpvoteState;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpvoteCommand: Send + Sync {
    /// Add the caller's upvote if absent, remove it otherwise.
    async fn toggle_upvote(&self, actor: &Actor, target: ContentRef)
    -> Result<UpvoteState, Error>;

    /// Current count and the caller's upvote state.
    async fn upvote_status(&self, actor: &Actor, target: ContentRef)
    -> Result<UpvoteState, Error>;
}
