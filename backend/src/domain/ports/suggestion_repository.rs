//! Port for suggestion persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ContentFilter, ContentStatus, Suggestion, SuggestionId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by suggestion repository adapters.
    pub enum SuggestionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String }
            => "suggestion repository connection failed: {message}" as unavailable,
        /// Query or mutation failed during execution.
        Query { message: String } => "suggestion repository query failed: {message}" as internal,
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SuggestionRepository: Send + Sync {
    async fn insert(&self, suggestion: &Suggestion) -> Result<(), SuggestionRepositoryError>;

    async fn find_by_id(
        &self,
        id: &SuggestionId,
    ) -> Result<Option<Suggestion>, SuggestionRepositoryError>;

    async fn list(
        &self,
        filter: &ContentFilter,
    ) -> Result<Vec<Suggestion>, SuggestionRepositoryError>;

    async fn update_status(
        &self,
        id: &SuggestionId,
        status: ContentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, SuggestionRepositoryError>;

    async fn delete(&self, id: &SuggestionId) -> Result<bool, SuggestionRepositoryError>;
}
