//! Upvote toggling.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{
    Notifier, UpvoteCommand, UpvoteRepository, UpvoteRepositoryError, UpvoteState,
};
use crate::domain::service_support::{port_error, target_not_found};
use crate::domain::{Actor, CivicEvent, ContentRef, Error};

fn map_repository_error(error: UpvoteRepositoryError, target: &ContentRef) -> Error {
    match error {
        UpvoteRepositoryError::TargetNotFound { .. } => target_not_found(target),
        other => port_error(other),
    }
}

/// Upvote service; new upvotes notify the content author.
#[derive(Clone)]
pub struct UpvoteService<R> {
    repo: Arc<R>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl<R> UpvoteService<R> {
    pub fn new(repo: Arc<R>, notifier: Arc<dyn Notifier>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            notifier,
            clock,
        }
    }
}

#[async_trait]
impl<R> UpvoteCommand for UpvoteService<R>
where
    R: UpvoteRepository,
{
    async fn toggle_upvote(
        &self,
        actor: &Actor,
        target: ContentRef,
    ) -> Result<UpvoteState, Error> {
        let outcome = self
            .repo
            .toggle(&actor.id, &target, self.clock.utc())
            .await
            .map_err(|error| map_repository_error(error, &target))?;
        debug!(
            %target,
            user_id = %actor.id,
            added = outcome.added,
            count = outcome.state.count,
            "upvote toggled"
        );

        if outcome.added {
            self.notifier
                .publish(CivicEvent::UpvoteAdded {
                    target,
                    target_author: outcome.target_author,
                    actor: actor.id.clone(),
                })
                .await;
        }

        Ok(outcome.state)
    }

    async fn upvote_status(
        &self,
        actor: &Actor,
        target: ContentRef,
    ) -> Result<UpvoteState, Error> {
        self.repo
            .status(&actor.id, &target)
            .await
            .map_err(|error| map_repository_error(error, &target))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{MockNotifier, MockUpvoteRepository, UpvoteToggle};
    use crate::domain::{ErrorCode, ReportId, Role, SuggestionId, UserId};
    use crate::test_support::{fixture_clock, fixture_timestamp};

    fn citizen() -> Actor {
        Actor::new(UserId::random(), Role::User)
    }

    fn toggle(added: bool, count: u32, author: UserId) -> UpvoteToggle {
        UpvoteToggle {
            state: UpvoteState {
                count,
                has_upvoted: added,
            },
            added,
            target_author: author,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn adding_an_upvote_stamps_it_with_the_clock_and_notifies_the_author() {
        let author = UserId::random();
        let expected_author = author.clone();
        let mut repo = MockUpvoteRepository::new();
        repo.expect_toggle()
            .withf(|_, _, at| *at == fixture_timestamp())
            .times(1)
            .return_once(move |_, _, _| Ok(toggle(true, 1, author)));
        let mut notifier = MockNotifier::new();
        notifier
            .expect_publish()
            .withf(move |event| {
                matches!(event, CivicEvent::UpvoteAdded { target_author, .. } if *target_author == expected_author)
            })
            .times(1)
            .return_const(());

        let state = UpvoteService::new(Arc::new(repo), Arc::new(notifier), fixture_clock())
            .toggle_upvote(&citizen(), ContentRef::Report(ReportId::random()))
            .await
            .expect("toggle succeeds");

        assert_eq!(
            state,
            UpvoteState {
                count: 1,
                has_upvoted: true
            }
        );
    }

    #[rstest]
    #[tokio::test]
    async fn removing_an_upvote_is_silent() {
        let mut repo = MockUpvoteRepository::new();
        repo.expect_toggle()
            .times(1)
            .return_once(|_, _, _| Ok(toggle(false, 0, UserId::random())));
        let mut notifier = MockNotifier::new();
        notifier.expect_publish().times(0);

        let state = UpvoteService::new(Arc::new(repo), Arc::new(notifier), fixture_clock())
            .toggle_upvote(&citizen(), ContentRef::Report(ReportId::random()))
            .await
            .expect("toggle succeeds");

        assert!(!state.has_upvoted);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_target_is_not_found() {
        let mut repo = MockUpvoteRepository::new();
        repo.expect_toggle()
            .times(1)
            .return_once(|_, target, _| {
                Err(UpvoteRepositoryError::target_not_found(target.to_string()))
            });

        let service = UpvoteService::new(
            Arc::new(repo),
            Arc::new(MockNotifier::new()),
            fixture_clock(),
        );
        let error = service
            .toggle_upvote(&citizen(), ContentRef::Suggestion(SuggestionId::random()))
            .await
            .expect_err("missing suggestion");

        assert_eq!(error.code(), ErrorCode::NotFound);
        assert_eq!(error.message(), "Suggestion not found.");
    }
}
