//! PostgreSQL-backed `SuggestionRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{SuggestionRepository, SuggestionRepositoryError};
use crate::domain::{
    ContentFilter, ContentKind, ContentSort, ContentStatus, Jurisdiction, Suggestion,
    SuggestionId, UserId,
};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::listing::{exact_ilike_pattern, page_bounds, stored_count};
use super::models::{NewSuggestionRow, SuggestionRow};
use super::pool::{DbPool, PoolError};
use super::schema::{comments, suggestions, upvotes};

/// Diesel-backed implementation of the suggestion repository port.
#[derive(Clone)]
pub struct DieselSuggestionRepository {
    pool: DbPool,
}

impl DieselSuggestionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SuggestionRepositoryError {
    map_basic_pool_error(error, |message| {
        SuggestionRepositoryError::connection(message)
    })
}

fn map_diesel_error(error: diesel::result::Error) -> SuggestionRepositoryError {
    map_basic_diesel_error(
        error,
        SuggestionRepositoryError::query,
        SuggestionRepositoryError::connection,
    )
}

fn row_to_suggestion(row: SuggestionRow) -> Result<Suggestion, SuggestionRepositoryError> {
    let corrupt = |err: crate::domain::ContentValidationError| {
        SuggestionRepositoryError::query(format!("invalid stored suggestion: {err}"))
    };
    Ok(Suggestion {
        id: SuggestionId::from_uuid(row.id),
        author: UserId::from_uuid(row.author_id),
        title: row.title,
        description: row.description,
        category: row.category,
        jurisdiction: Jurisdiction::new(row.municipality, row.ward).map_err(corrupt)?,
        status: row.status.parse::<ContentStatus>().map_err(corrupt)?,
        upvote_count: stored_count(row.upvote_count),
        comment_count: stored_count(row.comment_count),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl SuggestionRepository for DieselSuggestionRepository {
    async fn insert(&self, suggestion: &Suggestion) -> Result<(), SuggestionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewSuggestionRow {
            id: *suggestion.id.as_uuid(),
            author_id: *suggestion.author.as_uuid(),
            title: &suggestion.title,
            description: &suggestion.description,
            category: &suggestion.category,
            municipality: suggestion.jurisdiction.municipality(),
            ward: suggestion.jurisdiction.ward(),
            status: suggestion.status.as_str(),
            upvote_count: i32::try_from(suggestion.upvote_count).unwrap_or(i32::MAX),
            comment_count: i32::try_from(suggestion.comment_count).unwrap_or(i32::MAX),
            created_at: suggestion.created_at,
            updated_at: suggestion.updated_at,
        };
        diesel::insert_into(suggestions::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &SuggestionId,
    ) -> Result<Option<Suggestion>, SuggestionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        suggestions::table
            .find(id.as_uuid())
            .select(SuggestionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_suggestion)
            .transpose()
    }

    async fn list(
        &self,
        filter: &ContentFilter,
    ) -> Result<Vec<Suggestion>, SuggestionRepositoryError> {
        let (limit, offset) =
            page_bounds(&filter.page).map_err(SuggestionRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = suggestions::table
            .select(SuggestionRow::as_select())
            .into_boxed();
        if let Some(status) = filter.status {
            query = query.filter(suggestions::status.eq(status.as_str()));
        }
        if let Some(municipality) = &filter.municipality {
            query =
                query.filter(suggestions::municipality.ilike(exact_ilike_pattern(municipality)));
        }
        if let Some(ward) = &filter.ward {
            query = query.filter(suggestions::ward.ilike(exact_ilike_pattern(ward)));
        }
        if let Some(author) = &filter.author {
            query = query.filter(suggestions::author_id.eq(*author.as_uuid()));
        }
        query = match filter.sort {
            ContentSort::Newest => {
                query.order((suggestions::created_at.desc(), suggestions::id.desc()))
            }
            ContentSort::Oldest => {
                query.order((suggestions::created_at.asc(), suggestions::id.asc()))
            }
            ContentSort::MostUpvoted => query.order((
                suggestions::upvote_count.desc(),
                suggestions::created_at.desc(),
                suggestions::id.desc(),
            )),
        };

        query
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(row_to_suggestion)
            .collect()
    }

    async fn update_status(
        &self,
        id: &SuggestionId,
        status: ContentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, SuggestionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(suggestions::table.find(id.as_uuid()))
            .set((
                suggestions::status.eq(status.as_str()),
                suggestions::updated_at.eq(updated_at),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &SuggestionId) -> Result<bool, SuggestionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuid = *id.as_uuid();
        let kind = ContentKind::Suggestion.as_str();
        conn.transaction(|conn| {
            async move {
                diesel::delete(
                    comments::table
                        .filter(comments::target_kind.eq(kind))
                        .filter(comments::target_id.eq(uuid)),
                )
                .execute(conn)
                .await?;
                diesel::delete(
                    upvotes::table
                        .filter(upvotes::target_kind.eq(kind))
                        .filter(upvotes::target_id.eq(uuid)),
                )
                .execute(conn)
                .await?;
                let removed = diesel::delete(suggestions::table.find(uuid))
                    .execute(conn)
                    .await?;
                Ok(removed > 0)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
