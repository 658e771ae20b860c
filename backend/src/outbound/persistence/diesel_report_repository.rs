//! PostgreSQL-backed `ReportRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{ReportRepository, ReportRepositoryError};
use crate::domain::{
    ContentFilter, ContentKind, ContentSort, ContentStatus, GeoPoint, Jurisdiction, Report,
    ReportId, UserId,
};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::listing::{exact_ilike_pattern, page_bounds, stored_count};
use super::models::{NewReportRow, ReportRow};
use super::pool::{DbPool, PoolError};
use super::schema::{comments, reports, upvotes};

/// Diesel-backed implementation of the report repository port.
#[derive(Clone)]
pub struct DieselReportRepository {
    pool: DbPool,
}

impl DieselReportRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReportRepositoryError {
    map_basic_pool_error(error, |message| ReportRepositoryError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> ReportRepositoryError {
    map_basic_diesel_error(
        error,
        ReportRepositoryError::query,
        ReportRepositoryError::connection,
    )
}

fn row_to_report(row: ReportRow) -> Result<Report, ReportRepositoryError> {
    let corrupt =
        |err: crate::domain::ContentValidationError| ReportRepositoryError::query(format!("invalid stored report: {err}"));
    Ok(Report {
        id: ReportId::from_uuid(row.id),
        author: UserId::from_uuid(row.author_id),
        title: row.title,
        description: row.description,
        status: row.status.parse::<ContentStatus>().map_err(corrupt)?,
        location: GeoPoint::new(row.latitude, row.longitude).map_err(corrupt)?,
        jurisdiction: Jurisdiction::new(row.municipality, row.ward).map_err(corrupt)?,
        photos: row.photos,
        upvote_count: stored_count(row.upvote_count),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl ReportRepository for DieselReportRepository {
    async fn insert(&self, report: &Report) -> Result<(), ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewReportRow {
            id: *report.id.as_uuid(),
            author_id: *report.author.as_uuid(),
            title: &report.title,
            description: &report.description,
            status: report.status.as_str(),
            latitude: report.location.latitude(),
            longitude: report.location.longitude(),
            municipality: report.jurisdiction.municipality(),
            ward: report.jurisdiction.ward(),
            photos: &report.photos,
            upvote_count: i32::try_from(report.upvote_count).unwrap_or(i32::MAX),
            created_at: report.created_at,
            updated_at: report.updated_at,
        };
        diesel::insert_into(reports::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &ReportId) -> Result<Option<Report>, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        reports::table
            .find(id.as_uuid())
            .select(ReportRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_report)
            .transpose()
    }

    async fn list(&self, filter: &ContentFilter) -> Result<Vec<Report>, ReportRepositoryError> {
        let (limit, offset) = page_bounds(&filter.page).map_err(ReportRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = reports::table.select(ReportRow::as_select()).into_boxed();
        if let Some(status) = filter.status {
            query = query.filter(reports::status.eq(status.as_str()));
        }
        if let Some(municipality) = &filter.municipality {
            query = query.filter(reports::municipality.ilike(exact_ilike_pattern(municipality)));
        }
        if let Some(ward) = &filter.ward {
            query = query.filter(reports::ward.ilike(exact_ilike_pattern(ward)));
        }
        if let Some(author) = &filter.author {
            query = query.filter(reports::author_id.eq(*author.as_uuid()));
        }
        query = match filter.sort {
            ContentSort::Newest => query.order((reports::created_at.desc(), reports::id.desc())),
            ContentSort::Oldest => query.order((reports::created_at.asc(), reports::id.asc())),
            ContentSort::MostUpvoted => query.order((
                reports::upvote_count.desc(),
                reports::created_at.desc(),
                reports::id.desc(),
            )),
        };

        query
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(row_to_report)
            .collect()
    }

    async fn update_status(
        &self,
        id: &ReportId,
        status: ContentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(reports::table.find(id.as_uuid()))
            .set((
                reports::status.eq(status.as_str()),
                reports::updated_at.eq(updated_at),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &ReportId) -> Result<bool, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuid = *id.as_uuid();
        let kind = ContentKind::Report.as_str();
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
                let removed = diesel::delete(reports::table.find(uuid))
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
