//! PostgreSQL-backed `CommentRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{CommentRepository, CommentRepositoryError};
use crate::domain::{Comment, CommentId, ContentKind, ContentRef, UserId};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::engagement_targets::{EngagementTxError, adjust_comments, lock_target};
use super::models::{CommentRow, NewCommentRow};
use super::pool::{DbPool, PoolError};
use super::schema::comments;

/// Diesel-backed implementation of the comment repository port.
#[derive(Clone)]
pub struct DieselCommentRepository {
    pool: DbPool,
}

impl DieselCommentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CommentRepositoryError {
    map_basic_pool_error(error, |message| CommentRepositoryError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> CommentRepositoryError {
    map_basic_diesel_error(
        error,
        CommentRepositoryError::query,
        CommentRepositoryError::connection,
    )
}

fn row_to_comment(row: CommentRow) -> Result<Comment, CommentRepositoryError> {
    let kind: ContentKind = row
        .target_kind
        .parse()
        .map_err(|_| CommentRepositoryError::query("invalid stored comment target"))?;
    Ok(Comment {
        id: CommentId::from_uuid(row.id),
        author: UserId::from_uuid(row.author_id),
        target: ContentRef::from_parts(kind, row.target_id),
        body: row.body,
        created_at: row.created_at,
    })
}

#[async_trait]
impl CommentRepository for DieselCommentRepository {
    async fn insert(&self, comment: &Comment) -> Result<UserId, CommentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let target = comment.target;
        let row = NewCommentRow {
            id: *comment.id.as_uuid(),
            author_id: *comment.author.as_uuid(),
            target_kind: target.kind().as_str(),
            target_id: target.id(),
            body: &comment.body,
            created_at: comment.created_at,
        };
        let outcome = conn
            .transaction::<_, EngagementTxError, _>(|conn| {
                async move {
                    let (author, _) = lock_target(conn, &target).await?;
                    diesel::insert_into(comments::table)
                        .values(&row)
                        .execute(conn)
                        .await?;
                    adjust_comments(conn, &target, 1).await?;
                    Ok(author)
                }
                .scope_boxed()
            })
            .await;
        match outcome {
            Ok(author) => Ok(UserId::from_uuid(author)),
            Err(EngagementTxError::TargetNotFound) => {
                Err(CommentRepositoryError::target_not_found(target.to_string()))
            }
            Err(EngagementTxError::Diesel(error)) => Err(map_diesel_error(error)),
        }
    }

    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, CommentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        comments::table
            .find(id.as_uuid())
            .select(CommentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_comment)
            .transpose()
    }

    async fn list_for_target(
        &self,
        target: &ContentRef,
    ) -> Result<Vec<Comment>, CommentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        comments::table
            .filter(comments::target_kind.eq(target.kind().as_str()))
            .filter(comments::target_id.eq(target.id()))
            .order((comments::created_at.asc(), comments::id.asc()))
            .select(CommentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(row_to_comment)
            .collect()
    }

    async fn delete(&self, id: &CommentId) -> Result<bool, CommentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuid = *id.as_uuid();
        let removed = conn
            .transaction(|conn| {
                async move {
                    let removed: Option<CommentRow> = diesel::delete(comments::table.find(uuid))
                        .returning(CommentRow::as_returning())
                        .get_result(conn)
                        .await
                        .optional()?;
                    let suggestion = removed
                        .as_ref()
                        .filter(|row| row.target_kind == ContentKind::Suggestion.as_str())
                        .map(|row| ContentRef::from_parts(ContentKind::Suggestion, row.target_id));
                    if let Some(target) = suggestion {
                        adjust_comments(conn, &target, -1).await?;
                    }
                    Ok(removed.is_some())
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(removed)
    }
}
