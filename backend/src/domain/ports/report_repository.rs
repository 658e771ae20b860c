//! Port for report persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ContentFilter, ContentStatus, Report, ReportId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by report repository adapters.
    pub enum ReportRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String }
            => "report repository connection failed: {message}" as unavailable,
        /// Query or mutation failed during execution.
        Query { message: String } => "report repository query failed: {message}" as internal,
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn insert(&self, report: &Report) -> Result<(), ReportRepositoryError>;

    async fn find_by_id(&self, id: &ReportId) -> Result<Option<Report>, ReportRepositoryError>;

    /// List reports matching `filter`, in the requested order and window.
    async fn list(&self, filter: &ContentFilter) -> Result<Vec<Report>, ReportRepositoryError>;

    /// Set the workflow status; returns whether the report exists.
    async fn update_status(
        &self,
        id: &ReportId,
        status: ContentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, ReportRepositoryError>;

    /// Delete a report with its comments and upvotes.
    async fn delete(&self, id: &ReportId) -> Result<bool, ReportRepositoryError>;
}
