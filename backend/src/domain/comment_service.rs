//! Comment domain services.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    CommentCommand, CommentQuery, CommentRepository, CommentRepositoryError, Notifier,
    UserRepository,
};
use crate::domain::service_support::{
    load_account, port_error, require_owner_or_admin, target_not_found,
};
use crate::domain::{Actor, CivicEvent, Comment, CommentBody, CommentId, ContentRef, Error};

fn map_repository_error(error: CommentRepositoryError) -> Error {
    match error {
        CommentRepositoryError::TargetNotFound { target } => {
            Error::not_found(format!("comment target {target} not found"))
        }
        other => port_error(other),
    }
}

/// Comment service; new comments notify the content author.
#[derive(Clone)]
pub struct CommentService<C, U> {
    comments: Arc<C>,
    users: Arc<U>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl<C, U> CommentService<C, U> {
    pub fn new(
        comments: Arc<C>,
        users: Arc<U>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            comments,
            users,
            notifier,
            clock,
        }
    }
}

#[async_trait]
impl<C, U> CommentCommand for CommentService<C, U>
where
    C: CommentRepository,
    U: UserRepository,
{
    async fn add_comment(
        &self,
        actor: &Actor,
        target: ContentRef,
        body: CommentBody,
    ) -> Result<Comment, Error> {
        let author = load_account(self.users.as_ref(), actor).await?;
        let comment = Comment::new(
            CommentId::random(),
            actor.id.clone(),
            target,
            body,
            self.clock.utc(),
        );
        let target_author = self
            .comments
            .insert(&comment)
            .await
            .map_err(|error| match error {
                CommentRepositoryError::TargetNotFound { .. } => target_not_found(&target),
                other => map_repository_error(other),
            })?;
        info!(comment_id = %comment.id, %target, "comment added");

        self.notifier
            .publish(CivicEvent::CommentAdded {
                target,
                target_author,
                actor: actor.id.clone(),
                actor_name: author.full_name().as_ref().to_owned(),
            })
            .await;

        Ok(comment)
    }

    async fn delete_comment(&self, actor: &Actor, id: CommentId) -> Result<(), Error> {
        let comment = self
            .comments
            .find_by_id(&id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found("Comment not found."))?;
        require_owner_or_admin(actor, &comment.author)?;

        let removed = self
            .comments
            .delete(&id)
            .await
            .map_err(map_repository_error)?;
        if !removed {
            return Err(Error::not_found("Comment not found."));
        }
        info!(comment_id = %id, user_id = %actor.id, "comment deleted");
        Ok(())
    }
}

#[async_trait]
impl<C, U> CommentQuery for CommentService<C, U>
where
    C: CommentRepository,
    U: UserRepository,
{
    async fn list_comments(&self, target: ContentRef) -> Result<Vec<Comment>, Error> {
        self.comments
            .list_for_target(&target)
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{MockCommentRepository, MockNotifier, MockUserRepository};
    use crate::domain::{ErrorCode, ReportId, Role, SuggestionId, UserId};
    use crate::test_support::{fixture_clock, fixture_timestamp, user_with_role};

    fn service(
        comments: MockCommentRepository,
        users: MockUserRepository,
        notifier: MockNotifier,
    ) -> CommentService<MockCommentRepository, MockUserRepository> {
        CommentService::new(
            Arc::new(comments),
            Arc::new(users),
            Arc::new(notifier),
            fixture_clock(),
        )
    }

    fn users_returning(account: crate::domain::User) -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(account)));
        users
    }

    #[rstest]
    #[tokio::test]
    async fn adding_a_comment_notifies_the_target_author() {
        let commenter = user_with_role(Role::User, "hari@example.com");
        let target_author = UserId::random();
        let returned_author = target_author.clone();

        let mut comments = MockCommentRepository::new();
        comments
            .expect_insert()
            .times(1)
            .return_once(move |_| Ok(returned_author));
        let mut notifier = MockNotifier::new();
        notifier
            .expect_publish()
            .withf(move |event| {
                matches!(
                    event,
                    CivicEvent::CommentAdded { target_author: author, actor_name, .. }
                        if *author == target_author && actor_name == "Test Person"
                )
            })
            .times(1)
            .return_const(());

        let comment = service(comments, users_returning(commenter.clone()), notifier)
            .add_comment(
                &Actor::new(commenter.id().clone(), Role::User),
                ContentRef::Suggestion(SuggestionId::random()),
                CommentBody::new("  Fully agree  ").expect("valid body"),
            )
            .await
            .expect("comment added");

        assert_eq!(comment.body, "Fully agree");
        assert_eq!(comment.created_at, fixture_timestamp());
    }

    #[rstest]
    #[tokio::test]
    async fn commenting_on_missing_content_is_not_found() {
        let commenter = user_with_role(Role::User, "hari@example.com");
        let mut comments = MockCommentRepository::new();
        comments
            .expect_insert()
            .return_once(|_| Err(CommentRepositoryError::target_not_found("report")));
        let mut notifier = MockNotifier::new();
        notifier.expect_publish().times(0);

        let error = service(comments, users_returning(commenter.clone()), notifier)
            .add_comment(
                &Actor::new(commenter.id().clone(), Role::User),
                ContentRef::Report(ReportId::random()),
                CommentBody::new("Still broken").expect("valid body"),
            )
            .await
            .expect_err("missing report");

        assert_eq!(error.code(), ErrorCode::NotFound);
        assert_eq!(error.message(), "Report not found.");
    }

    #[rstest]
    #[tokio::test]
    async fn only_author_or_admin_deletes_comments() {
        let author = UserId::random();
        let comment = Comment::new(
            CommentId::random(),
            author,
            ContentRef::Report(ReportId::random()),
            CommentBody::new("First!").expect("valid body"),
            fixture_timestamp(),
        );
        let id = comment.id;
        let mut comments = MockCommentRepository::new();
        comments
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(comment)));
        comments.expect_delete().times(0);

        let error = service(comments, MockUserRepository::new(), MockNotifier::new())
            .delete_comment(&Actor::new(UserId::random(), Role::User), id)
            .await
            .expect_err("stranger rejected");

        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn admin_deletes_any_comment() {
        let comment = Comment::new(
            CommentId::random(),
            UserId::random(),
            ContentRef::Report(ReportId::random()),
            CommentBody::new("spam").expect("valid body"),
            fixture_timestamp(),
        );
        let id = comment.id;
        let mut comments = MockCommentRepository::new();
        comments
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(comment)));
        comments.expect_delete().times(1).return_once(|_| Ok(true));

        service(comments, MockUserRepository::new(), MockNotifier::new())
            .delete_comment(&Actor::new(UserId::random(), Role::Admin), id)
            .await
            .expect("admin may delete");
    }
}
