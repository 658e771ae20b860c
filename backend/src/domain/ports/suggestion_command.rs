//! Driving port for suggestion mutations.

use async_trait::async_trait;

use crate::domain::{Actor, ContentStatus, Error, NewSuggestion, Suggestion, SuggestionId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SuggestionCommand: Send + Sync {
    async fn create_suggestion(
        &self,
        actor: &Actor,
        input: NewSuggestion,
    ) -> Result<Suggestion, Error>;

    /// Move a suggestion through the workflow (staff only).
    async fn update_suggestion_status(
        &self,
        actor: &Actor,
        id: SuggestionId,
        status: ContentStatus,
    ) -> Result<Suggestion, Error>;

    /// Delete a suggestion (author or administrator).
    async fn delete_suggestion(&self, actor: &Actor, id: SuggestionId) -> Result<(), Error>;
}
