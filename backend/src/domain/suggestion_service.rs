//! Suggestion domain services.
//!
//! Suggestions follow the same workflow and permission rules as reports;
//! they additionally carry a category and a comment count.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    Notifier, SuggestionCommand, SuggestionQuery, SuggestionRepository, UpvoteRepository,
    UpvoteRepositoryError, UserRepository,
};
use crate::domain::service_support::{
    content_not_found, load_account, port_error, require_owner_or_admin, require_staff,
};
use crate::domain::{
    Actor, CivicEvent, ContentFilter, ContentKind, ContentRef, ContentStatus, Error,
    NewSuggestion, Suggestion, SuggestionDetail, SuggestionId, UserId, authorize_status_change,
};

fn map_upvote_error(error: UpvoteRepositoryError) -> Error {
    match error {
        UpvoteRepositoryError::TargetNotFound { .. } => {
            content_not_found(ContentKind::Suggestion)
        }
        other => port_error(other),
    }
}

/// Suggestion service implementing the suggestion driving ports.
#[derive(Clone)]
pub struct SuggestionService<S, U, V> {
    suggestions: Arc<S>,
    users: Arc<U>,
    upvotes: Arc<V>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl<S, U, V> SuggestionService<S, U, V> {
    pub fn new(
        suggestions: Arc<S>,
        users: Arc<U>,
        upvotes: Arc<V>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            suggestions,
            users,
            upvotes,
            notifier,
            clock,
        }
    }
}

impl<S, U, V> SuggestionService<S, U, V>
where
    S: SuggestionRepository,
{
    async fn find(&self, id: &SuggestionId) -> Result<Suggestion, Error> {
        self.suggestions
            .find_by_id(id)
            .await
            .map_err(port_error)?
            .ok_or_else(|| content_not_found(ContentKind::Suggestion))
    }
}

#[async_trait]
impl<S, U, V> SuggestionCommand for SuggestionService<S, U, V>
where
    S: SuggestionRepository,
    U: UserRepository,
    V: UpvoteRepository,
{
    async fn create_suggestion(
        &self,
        actor: &Actor,
        input: NewSuggestion,
    ) -> Result<Suggestion, Error> {
        let suggestion = Suggestion::submit(
            SuggestionId::random(),
            actor.id.clone(),
            input,
            self.clock.utc(),
        );
        self.suggestions
            .insert(&suggestion)
            .await
            .map_err(port_error)?;
        info!(suggestion_id = %suggestion.id, user_id = %actor.id, "suggestion created");
        Ok(suggestion)
    }

    async fn update_suggestion_status(
        &self,
        actor: &Actor,
        id: SuggestionId,
        status: ContentStatus,
    ) -> Result<Suggestion, Error> {
        require_staff(actor)?;
        let suggestion = self.find(&id).await?;
        let staff = load_account(self.users.as_ref(), actor).await?;
        authorize_status_change(&staff, &suggestion.jurisdiction)?;

        if suggestion.status == status {
            return Ok(suggestion);
        }

        let now = self.clock.utc();
        let updated = self
            .suggestions
            .update_status(&id, status, now)
            .await
            .map_err(port_error)?;
        if !updated {
            return Err(content_not_found(ContentKind::Suggestion));
        }
        info!(
            suggestion_id = %id,
            from = %suggestion.status,
            to = %status,
            "suggestion status changed"
        );

        self.notifier
            .publish(CivicEvent::SuggestionStatusChanged {
                suggestion: ContentRef::Suggestion(id),
                title: suggestion.title.clone(),
                author: suggestion.author.clone(),
                actor: actor.id.clone(),
                from: suggestion.status,
                to: status,
            })
            .await;

        Ok(Suggestion {
            status,
            updated_at: now,
            ..suggestion
        })
    }

    async fn delete_suggestion(&self, actor: &Actor, id: SuggestionId) -> Result<(), Error> {
        let suggestion = self.find(&id).await?;
        require_owner_or_admin(actor, &suggestion.author)?;
        let removed = self
            .suggestions
            .delete(&id)
            .await
            .map_err(port_error)?;
        if !removed {
            return Err(content_not_found(ContentKind::Suggestion));
        }
        info!(suggestion_id = %id, user_id = %actor.id, "suggestion deleted");
        Ok(())
    }
}

#[async_trait]
impl<S, U, V> SuggestionQuery for SuggestionService<S, U, V>
where
    S: SuggestionRepository,
    U: UserRepository,
    V: UpvoteRepository,
{
    async fn list_suggestions(&self, filter: ContentFilter) -> Result<Vec<Suggestion>, Error> {
        self.suggestions
            .list(&filter)
            .await
            .map_err(port_error)
    }

    async fn get_suggestion(
        &self,
        viewer: Option<UserId>,
        id: SuggestionId,
    ) -> Result<SuggestionDetail, Error> {
        let suggestion = self.find(&id).await?;
        let has_user_upvoted = match viewer {
            Some(user) => {
                self.upvotes
                    .status(&user, &ContentRef::Suggestion(id))
                    .await
                    .map_err(map_upvote_error)?
                    .has_upvoted
            }
            None => false,
        };
        Ok(SuggestionDetail {
            suggestion,
            has_user_upvoted,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{
        MockNotifier, MockSuggestionRepository, MockUpvoteRepository, MockUserRepository,
    };
    use crate::domain::{ErrorCode, Jurisdiction, Role};
    use crate::test_support::{fixture_clock, fixture_timestamp, user_with_role};

    fn stored_suggestion(author: &UserId) -> Suggestion {
        let input = NewSuggestion::new(
            "Protected bike lanes",
            "Separate cyclists from traffic on the ring road.",
            "transport",
            Jurisdiction::new("Kathmandu", "3").expect("jurisdiction"),
        )
        .expect("valid suggestion");
        Suggestion::submit(SuggestionId::random(), author.clone(), input, fixture_timestamp())
    }

    fn service(
        suggestions: MockSuggestionRepository,
        users: MockUserRepository,
        notifier: MockNotifier,
    ) -> SuggestionService<MockSuggestionRepository, MockUserRepository, MockUpvoteRepository>
    {
        SuggestionService::new(
            Arc::new(suggestions),
            Arc::new(users),
            Arc::new(MockUpvoteRepository::new()),
            Arc::new(notifier),
            fixture_clock(),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn completion_by_admin_notifies_author() {
        let admin = user_with_role(Role::Admin, "admin@communityfix.np");
        let suggestion = stored_suggestion(&UserId::random());
        let id = suggestion.id;

        let mut suggestions = MockSuggestionRepository::new();
        suggestions
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(suggestion)));
        suggestions
            .expect_update_status()
            .times(1)
            .return_once(|_, _, _| Ok(true));
        let mut users = MockUserRepository::new();
        let account = admin.clone();
        users
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(account)));
        let mut notifier = MockNotifier::new();
        notifier
            .expect_publish()
            .withf(|event| matches!(event, CivicEvent::SuggestionStatusChanged { .. }))
            .times(1)
            .return_const(());

        let updated = service(suggestions, users, notifier)
            .update_suggestion_status(
                &Actor::new(admin.id().clone(), Role::Admin),
                id,
                ContentStatus::Completed,
            )
            .await
            .expect("status updated");

        assert_eq!(updated.status, ContentStatus::Completed);
        assert_eq!(updated.updated_at, fixture_timestamp());
    }

    #[rstest]
    #[tokio::test]
    async fn deleted_staff_account_is_unauthorised() {
        let suggestion = stored_suggestion(&UserId::random());
        let id = suggestion.id;
        let mut suggestions = MockSuggestionRepository::new();
        suggestions
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(suggestion)));
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().return_once(|_| Ok(None));

        let error = service(suggestions, users, MockNotifier::new())
            .update_suggestion_status(
                &Actor::new(UserId::random(), Role::Municipality),
                id,
                ContentStatus::InProgress,
            )
            .await
            .expect_err("account gone");

        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_suggestion_is_not_found() {
        let mut suggestions = MockSuggestionRepository::new();
        suggestions.expect_find_by_id().return_once(|_| Ok(None));

        let error = service(suggestions, MockUserRepository::new(), MockNotifier::new())
            .delete_suggestion(
                &Actor::new(UserId::random(), Role::Admin),
                SuggestionId::random(),
            )
            .await
            .expect_err("missing suggestion");

        assert_eq!(error.message(), "Suggestion not found.");
    }
}
