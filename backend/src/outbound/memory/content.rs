//! Report and suggestion repositories over the in-memory store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    ReportRepository, ReportRepositoryError, SuggestionRepository, SuggestionRepositoryError,
};
use crate::domain::{
    ContentFilter, ContentRef, ContentStatus, Report, ReportId, Suggestion, SuggestionId,
};

use super::{InMemoryStore, list_content};

#[async_trait]
impl ReportRepository for InMemoryStore {
    async fn insert(&self, report: &Report) -> Result<(), ReportRepositoryError> {
        let mut state = self.lock().map_err(ReportRepositoryError::query)?;
        state.reports.push(report.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ReportId) -> Result<Option<Report>, ReportRepositoryError> {
        let state = self.lock().map_err(ReportRepositoryError::query)?;
        Ok(state.reports.iter().find(|report| report.id == *id).cloned())
    }

    async fn list(&self, filter: &ContentFilter) -> Result<Vec<Report>, ReportRepositoryError> {
        let state = self.lock().map_err(ReportRepositoryError::query)?;
        Ok(list_content(&state.reports, filter))
    }

    async fn update_status(
        &self,
        id: &ReportId,
        status: ContentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, ReportRepositoryError> {
        let mut state = self.lock().map_err(ReportRepositoryError::query)?;
        let Some(report) = state.reports.iter_mut().find(|report| report.id == *id) else {
            return Ok(false);
        };
        report.status = status;
        report.updated_at = updated_at;
        Ok(true)
    }

    async fn delete(&self, id: &ReportId) -> Result<bool, ReportRepositoryError> {
        let mut state = self.lock().map_err(ReportRepositoryError::query)?;
        let before = state.reports.len();
        state.reports.retain(|report| report.id != *id);
        if state.reports.len() == before {
            return Ok(false);
        }
        state.remove_engagement(&ContentRef::Report(*id));
        Ok(true)
    }
}

#[async_trait]
impl SuggestionRepository for InMemoryStore {
    async fn insert(&self, suggestion: &Suggestion) -> Result<(), SuggestionRepositoryError> {
        let mut state = self.lock().map_err(SuggestionRepositoryError::query)?;
        state.suggestions.push(suggestion.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &SuggestionId,
    ) -> Result<Option<Suggestion>, SuggestionRepositoryError> {
        let state = self.lock().map_err(SuggestionRepositoryError::query)?;
        Ok(state
            .suggestions
            .iter()
            .find(|suggestion| suggestion.id == *id)
            .cloned())
    }

    async fn list(
        &self,
        filter: &ContentFilter,
    ) -> Result<Vec<Suggestion>, SuggestionRepositoryError> {
        let state = self.lock().map_err(SuggestionRepositoryError::query)?;
        Ok(list_content(&state.suggestions, filter))
    }

    async fn update_status(
        &self,
        id: &SuggestionId,
        status: ContentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, SuggestionRepositoryError> {
        let mut state = self.lock().map_err(SuggestionRepositoryError::query)?;
        let Some(suggestion) = state
            .suggestions
            .iter_mut()
            .find(|suggestion| suggestion.id == *id)
        else {
            return Ok(false);
        };
        suggestion.status = status;
        suggestion.updated_at = updated_at;
        Ok(true)
    }

    async fn delete(&self, id: &SuggestionId) -> Result<bool, SuggestionRepositoryError> {
        let mut state = self.lock().map_err(SuggestionRepositoryError::query)?;
        let before = state.suggestions.len();
        state.suggestions.retain(|suggestion| suggestion.id != *id);
        if state.suggestions.len() == before {
            return Ok(false);
        }
        state.remove_engagement(&ContentRef::Suggestion(*id));
        Ok(true)
    }
}
