//! Driving port for comment mutations.

use async_trait::async_trait;

use crate::domain::{Actor, Comment, CommentBody, CommentId, ContentRef, Error};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentCommand: Send + Sync {
    async fn add_comment(
        &self,
        actor: &Actor,
        target: ContentRef,
        body: CommentBody,
    ) -> Result<Comment, Error>;

    /// Delete a comment (its author or an administrator).
    async fn delete_comment(&self, actor: &Actor, id: CommentId) -> Result<(), Error>;
}
