//! Driving port for report reads.

use async_trait::async_trait;

use crate::domain::{ContentFilter, Error, Report, ReportDetail, ReportId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportQuery: Send + Sync {
    async fn list_reports(&self, filter: ContentFilter) -> Result<Vec<Report>, Error>;

    /// Fetch one report; `viewer` decides `has_user_upvoted`.
    async fn get_report(&self, viewer: Option<UserId>, id: ReportId)
    -> Result<ReportDetail, Error>;
}
