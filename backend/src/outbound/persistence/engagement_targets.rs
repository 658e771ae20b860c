//! Row-level helpers for the polymorphic comment and upvote targets.
//!
//! Every helper runs on a connection that is already inside a transaction;
//! `lock_target` takes a `FOR UPDATE` lock so counter updates serialise per
//! report or suggestion.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ContentRef;

use super::schema::{reports, suggestions};

/// Failure inside an engagement transaction.
#[derive(Debug)]
pub(crate) enum EngagementTxError {
    Diesel(diesel::result::Error),
    TargetNotFound,
}

impl From<diesel::result::Error> for EngagementTxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

/// Lock the target row and return its author and upvote count.
pub(crate) async fn lock_target(
    conn: &mut AsyncPgConnection,
    target: &ContentRef,
) -> Result<(Uuid, i32), EngagementTxError> {
    let id = target.id();
    let found = match target {
        ContentRef::Report(_) => {
            reports::table
                .find(id)
                .select((reports::author_id, reports::upvote_count))
                .for_update()
                .first::<(Uuid, i32)>(conn)
                .await
        }
        ContentRef::Suggestion(_) => {
            suggestions::table
                .find(id)
                .select((suggestions::author_id, suggestions::upvote_count))
                .for_update()
                .first::<(Uuid, i32)>(conn)
                .await
        }
    }
    .optional()?;
    found.ok_or(EngagementTxError::TargetNotFound)
}

/// Add `delta` to the target's upvote count and return the new value.
pub(crate) async fn adjust_upvotes(
    conn: &mut AsyncPgConnection,
    target: &ContentRef,
    delta: i32,
) -> QueryResult<i32> {
    let id = target.id();
    match target {
        ContentRef::Report(_) => {
            diesel::update(reports::table.find(id))
                .set(reports::upvote_count.eq(reports::upvote_count + delta))
                .returning(reports::upvote_count)
                .get_result(conn)
                .await
        }
        ContentRef::Suggestion(_) => {
            diesel::update(suggestions::table.find(id))
                .set(suggestions::upvote_count.eq(suggestions::upvote_count + delta))
                .returning(suggestions::upvote_count)
                .get_result(conn)
                .await
        }
    }
}

/// Add `delta` to a suggestion's comment count; reports keep no counter.
pub(crate) async fn adjust_comments(
    conn: &mut AsyncPgConnection,
    target: &ContentRef,
    delta: i32,
) -> QueryResult<()> {
    if let ContentRef::Suggestion(id) = target {
        diesel::update(suggestions::table.find(id.as_uuid()))
            .set(suggestions::comment_count.eq(suggestions::comment_count + delta))
            .execute(conn)
            .await?;
    }
    Ok(())
}
