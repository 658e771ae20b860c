//! PostgreSQL-backed `UpvoteRepository` implementation using Diesel ORM.
//!
//! A toggle locks the target row, flips the `upvotes` row and adjusts the
//! denormalised counter in one transaction, so concurrent toggles on the same
//! item never lose an update.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{
    UpvoteRepository, UpvoteRepositoryError, UpvoteState, UpvoteToggle,
};
use crate::domain::{ContentRef, UserId};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::engagement_targets::{EngagementTxError, adjust_upvotes, lock_target};
use super::listing::stored_count;
use super::models::NewUpvoteRow;
use super::pool::{DbPool, PoolError};
use super::schema::{reports, suggestions, upvotes};

/// Diesel-backed implementation of the upvote repository port.
#[derive(Clone)]
pub struct DieselUpvoteRepository {
    pool: DbPool,
}

impl DieselUpvoteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UpvoteRepositoryError {
    map_basic_pool_error(error, |message| UpvoteRepositoryError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> UpvoteRepositoryError {
    map_basic_diesel_error(
        error,
        UpvoteRepositoryError::query,
        UpvoteRepositoryError::connection,
    )
}

fn map_tx_error(error: EngagementTxError, target: &ContentRef) -> UpvoteRepositoryError {
    match error {
        EngagementTxError::TargetNotFound => {
            UpvoteRepositoryError::target_not_found(target.to_string())
        }
        EngagementTxError::Diesel(error) => map_diesel_error(error),
    }
}

#[async_trait]
impl UpvoteRepository for DieselUpvoteRepository {
    async fn toggle(
        &self,
        user: &UserId,
        target: &ContentRef,
        at: DateTime<Utc>,
    ) -> Result<UpvoteToggle, UpvoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let voter = *user.as_uuid();
        let target = *target;
        let kind = target.kind().as_str();
        let (author, count, added) = conn
            .transaction::<_, EngagementTxError, _>(|conn| {
                async move {
                    let (author, _) = lock_target(conn, &target).await?;
                    let removed = diesel::delete(
                        upvotes::table
                            .filter(upvotes::user_id.eq(voter))
                            .filter(upvotes::target_kind.eq(kind))
                            .filter(upvotes::target_id.eq(target.id())),
                    )
                    .execute(conn)
                    .await?;
                    let added = removed == 0;
                    if added {
                        diesel::insert_into(upvotes::table)
                            .values(&NewUpvoteRow {
                                user_id: voter,
                                target_kind: kind,
                                target_id: target.id(),
                                created_at: at,
                            })
                            .on_conflict_do_nothing()
                            .execute(conn)
                            .await?;
                    }
                    let delta = if added { 1 } else { -1 };
                    let count = adjust_upvotes(conn, &target, delta).await?;
                    Ok((author, count, added))
                }
                .scope_boxed()
            })
            .await
            .map_err(|error| map_tx_error(error, &target))?;

        Ok(UpvoteToggle {
            state: UpvoteState {
                count: stored_count(count),
                has_upvoted: added,
            },
            added,
            target_author: UserId::from_uuid(author),
        })
    }

    async fn status(
        &self,
        user: &UserId,
        target: &ContentRef,
    ) -> Result<UpvoteState, UpvoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: Option<i32> = match target {
            ContentRef::Report(id) => {
                reports::table
                    .find(id.as_uuid())
                    .select(reports::upvote_count)
                    .first(&mut conn)
                    .await
            }
            ContentRef::Suggestion(id) => {
                suggestions::table
                    .find(id.as_uuid())
                    .select(suggestions::upvote_count)
                    .first(&mut conn)
                    .await
            }
        }
        .optional()
        .map_err(map_diesel_error)?;
        let count = count
            .ok_or_else(|| UpvoteRepositoryError::target_not_found(target.to_string()))?;

        let has_upvoted = diesel::select(diesel::dsl::exists(
            upvotes::table
                .filter(upvotes::user_id.eq(user.as_uuid()))
                .filter(upvotes::target_kind.eq(target.kind().as_str()))
                .filter(upvotes::target_id.eq(target.id())),
        ))
        .get_result::<bool>(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(UpvoteState {
            count: stored_count(count),
            has_upvoted,
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ReportId;

    #[rstest]
    fn missing_targets_name_the_content() {
        let target = ContentRef::Report(ReportId::random());
        let error = map_tx_error(EngagementTxError::TargetNotFound, &target);
        assert_eq!(
            error,
            UpvoteRepositoryError::target_not_found(target.to_string())
        );
    }

    #[rstest]
    fn database_failures_are_query_errors() {
        let target = ContentRef::Report(ReportId::random());
        let error = map_tx_error(
            EngagementTxError::Diesel(diesel::result::Error::NotFound),
            &target,
        );
        assert!(matches!(error, UpvoteRepositoryError::Query { .. }));
    }
}
