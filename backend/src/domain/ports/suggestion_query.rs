//! Driving port for suggestion reads.

use async_trait::async_trait;

use crate::domain::{ContentFilter, Error, Suggestion, SuggestionDetail, SuggestionId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SuggestionQuery: Send + Sync {
    async fn list_suggestions(&self, filter: ContentFilter) -> Result<Vec<Suggestion>, Error>;

    async fn get_suggestion(
        &self,
        viewer: Option<UserId>,
        id: SuggestionId,
    ) -> Result<SuggestionDetail, Error>;
}
