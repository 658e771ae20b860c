//! Driving port for report mutations.

use async_trait::async_trait;

use crate::domain::{Actor, ContentStatus, Error, NewReport, Report, ReportId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportCommand: Send + Sync {
    async fn create_report(&self, actor: &Actor, input: NewReport) -> Result<Report, Error>;

    /// Move a report through the workflow (staff only).
    async fn update_report_status(
        &self,
        actor: &Actor,
        id: ReportId,
        status: ContentStatus,
    ) -> Result<Report, Error>;

    /// Delete a report (author or administrator).
    async fn delete_report(&self, actor: &Actor, id: ReportId) -> Result<(), Error>;
}
