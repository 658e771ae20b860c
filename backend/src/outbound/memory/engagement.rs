//! Comment and upvote repositories over the in-memory store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    CommentRepository, CommentRepositoryError, UpvoteRepository, UpvoteRepositoryError,
    UpvoteState, UpvoteToggle,
};
use crate::domain::{Comment, CommentId, ContentRef, UserId};

use super::InMemoryStore;

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn insert(&self, comment: &Comment) -> Result<UserId, CommentRepositoryError> {
        let mut state = self.lock().map_err(CommentRepositoryError::query)?;
        let author = state
            .target_author(&comment.target)
            .ok_or_else(|| CommentRepositoryError::target_not_found(comment.target.to_string()))?;
        state.comments.push(comment.clone());
        state.adjust_comment_count(&comment.target, 1);
        Ok(author)
    }

    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, CommentRepositoryError> {
        let state = self.lock().map_err(CommentRepositoryError::query)?;
        Ok(state.comments.iter().find(|comment| comment.id == *id).cloned())
    }

    async fn list_for_target(
        &self,
        target: &ContentRef,
    ) -> Result<Vec<Comment>, CommentRepositoryError> {
        let state = self.lock().map_err(CommentRepositoryError::query)?;
        let mut comments: Vec<Comment> = state
            .comments
            .iter()
            .filter(|comment| comment.target == *target)
            .cloned()
            .collect();
        comments.sort_by_key(|comment| comment.created_at);
        Ok(comments)
    }

    async fn delete(&self, id: &CommentId) -> Result<bool, CommentRepositoryError> {
        let mut state = self.lock().map_err(CommentRepositoryError::query)?;
        let Some(index) = state.comments.iter().position(|comment| comment.id == *id) else {
            return Ok(false);
        };
        let removed = state.comments.remove(index);
        state.adjust_comment_count(&removed.target, -1);
        Ok(true)
    }
}

#[async_trait]
impl UpvoteRepository for InMemoryStore {
    async fn toggle(
        &self,
        user: &UserId,
        target: &ContentRef,
        at: DateTime<Utc>,
    ) -> Result<UpvoteToggle, UpvoteRepositoryError> {
        let mut state = self.lock().map_err(UpvoteRepositoryError::query)?;
        let key = (user.clone(), *target);
        let already = state.upvotes.contains_key(&key);
        let (target_author, count) = state
            .upvote_target_mut(target)
            .ok_or_else(|| UpvoteRepositoryError::target_not_found(target.to_string()))?;
        if already {
            *count = count.saturating_sub(1);
        } else {
            *count = count.saturating_add(1);
        }
        let count = *count;
        if already {
            state.upvotes.remove(&key);
        } else {
            state.upvotes.insert(key, at);
        }
        Ok(UpvoteToggle {
            state: UpvoteState {
                count,
                has_upvoted: !already,
            },
            added: !already,
            target_author,
        })
    }

    async fn status(
        &self,
        user: &UserId,
        target: &ContentRef,
    ) -> Result<UpvoteState, UpvoteRepositoryError> {
        let mut state = self.lock().map_err(UpvoteRepositoryError::query)?;
        let has_upvoted = state.upvotes.contains_key(&(user.clone(), *target));
        let (_, count) = state
            .upvote_target_mut(target)
            .ok_or_else(|| UpvoteRepositoryError::target_not_found(target.to_string()))?;
        Ok(UpvoteState {
            count: *count,
            has_upvoted,
        })
    }
}
