//! Port for comment persistence.
//!
//! Adapters keep the denormalised suggestion comment count in step with the
//! comment rows: insert and delete adjust it in the same transaction.

use async_trait::async_trait;

use crate::domain::{Comment, CommentId, ContentRef, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by comment repository adapters.
    pub enum CommentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String }
            => "comment repository connection failed: {message}" as unavailable,
        /// Query or mutation failed during execution.
        Query { message: String } => "comment repository query failed: {message}" as internal,
        /// The report or suggestion being commented on does not exist.
        TargetNotFound { target: String } => "comment target not found: {target}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert a comment and return the author of the commented content.
    async fn insert(&self, comment: &Comment) -> Result<UserId, CommentRepositoryError>;

    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, CommentRepositoryError>;

    /// Comments on `target`, oldest first.
    async fn list_for_target(
        &self,
        target: &ContentRef,
    ) -> Result<Vec<Comment>, CommentRepositoryError>;

    /// Delete a comment; returns whether a row was removed.
    async fn delete(&self, id: &CommentId) -> Result<bool, CommentRepositoryError>;
}
