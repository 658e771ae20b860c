//! Report domain services.
//!
//! Citizens submit reports; staff move them through the workflow; authors
//! and administrators may delete them. Status changes announce a
//! [`CivicEvent`] so the author is notified.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    Notifier, ReportCommand, ReportQuery, ReportRepository, UpvoteRepository,
    UpvoteRepositoryError, UserRepository,
};
use crate::domain::service_support::{
    content_not_found, load_account, port_error, require_owner_or_admin, require_staff,
};
use crate::domain::{
    Actor, CivicEvent, ContentFilter, ContentKind, ContentRef, ContentStatus, Error, NewReport,
    Report, ReportDetail, ReportId, UserId, authorize_status_change,
};

fn map_upvote_error(error: UpvoteRepositoryError) -> Error {
    match error {
        UpvoteRepositoryError::TargetNotFound { .. } => content_not_found(ContentKind::Report),
        other => port_error(other),
    }
}

/// Report service implementing the report driving ports.
#[derive(Clone)]
pub struct ReportService<R, U, V> {
    reports: Arc<R>,
    users: Arc<U>,
    upvotes: Arc<V>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl<R, U, V> ReportService<R, U, V> {
    pub fn new(
        reports: Arc<R>,
        users: Arc<U>,
        upvotes: Arc<V>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            reports,
            users,
            upvotes,
            notifier,
            clock,
        }
    }
}

impl<R, U, V> ReportService<R, U, V>
where
    R: ReportRepository,
{
    async fn find(&self, id: &ReportId) -> Result<Report, Error> {
        self.reports
            .find_by_id(id)
            .await
            .map_err(port_error)?
            .ok_or_else(|| content_not_found(ContentKind::Report))
    }
}

#[async_trait]
impl<R, U, V> ReportCommand for ReportService<R, U, V>
where
    R: ReportRepository,
    U: UserRepository,
    V: UpvoteRepository,
{
    async fn create_report(&self, actor: &Actor, input: NewReport) -> Result<Report, Error> {
        let report = Report::submit(ReportId::random(), actor.id.clone(), input, self.clock.utc());
        self.reports
            .insert(&report)
            .await
            .map_err(port_error)?;
        info!(report_id = %report.id, user_id = %actor.id, "report created");
        Ok(report)
    }

    async fn update_report_status(
        &self,
        actor: &Actor,
        id: ReportId,
        status: ContentStatus,
    ) -> Result<Report, Error> {
        require_staff(actor)?;
        let report = self.find(&id).await?;
        let staff = load_account(self.users.as_ref(), actor).await?;
        authorize_status_change(&staff, &report.jurisdiction)?;

        if report.status == status {
            return Ok(report);
        }

        let now = self.clock.utc();
        let updated = self
            .reports
            .update_status(&id, status, now)
            .await
            .map_err(port_error)?;
        if !updated {
            return Err(content_not_found(ContentKind::Report));
        }
        info!(report_id = %id, from = %report.status, to = %status, "report status changed");

        self.notifier
            .publish(CivicEvent::ReportStatusChanged {
                report: ContentRef::Report(id),
                title: report.title.clone(),
                author: report.author.clone(),
                actor: actor.id.clone(),
                from: report.status,
                to: status,
            })
            .await;

        Ok(Report {
            status,
            updated_at: now,
            ..report
        })
    }

    async fn delete_report(&self, actor: &Actor, id: ReportId) -> Result<(), Error> {
        let report = self.find(&id).await?;
        require_owner_or_admin(actor, &report.author)?;
        let removed = self
            .reports
            .delete(&id)
            .await
            .map_err(port_error)?;
        if !removed {
            return Err(content_not_found(ContentKind::Report));
        }
        info!(report_id = %id, user_id = %actor.id, "report deleted");
        Ok(())
    }
}

#[async_trait]
impl<R, U, V> ReportQuery for ReportService<R, U, V>
where
    R: ReportRepository,
    U: UserRepository,
    V: UpvoteRepository,
{
    async fn list_reports(&self, filter: ContentFilter) -> Result<Vec<Report>, Error> {
        self.reports
            .list(&filter)
            .await
            .map_err(port_error)
    }

    async fn get_report(
        &self,
        viewer: Option<UserId>,
        id: ReportId,
    ) -> Result<ReportDetail, Error> {
        let report = self.find(&id).await?;
        let has_user_upvoted = match viewer {
            Some(user) => {
                self.upvotes
                    .status(&user, &ContentRef::Report(id))
                    .await
                    .map_err(map_upvote_error)?
                    .has_upvoted
            }
            None => false,
        };
        Ok(ReportDetail {
            report,
            has_user_upvoted,
        })
    }
}

#[cfg(test)]
#[path = "report_service_tests.rs"]
mod tests;
