//! Driving port for comment reads.

use async_trait::async_trait;

use crate::domain::{Comment, ContentRef, Error};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentQuery: Send + Sync {
    /// Comments on `target`, oldest first.
    async fn list_comments(&self, target: ContentRef) -> Result<Vec<Comment>, Error>;
}
