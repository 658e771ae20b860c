//! User repository over the in-memory store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{UserCredentials, UserPersistenceError, UserRepository};
use crate::domain::{ContentRef, Email, PasswordHash, ProfileUpdate, Role, User, UserId};

use super::{InMemoryStore, State, StoredUser};

impl State {
    /// Delete an account together with everything it authored.
    ///
    /// Counters on surviving content are decremented for the account's
    /// upvotes and comments before the rows go away.
    fn remove_user(&mut self, id: &UserId) {
        let upvoted: Vec<ContentRef> = self
            .upvotes
            .keys()
            .filter(|(voter, _)| voter == id)
            .map(|(_, target)| *target)
            .collect();
        for target in &upvoted {
            if let Some((_, count)) = self.upvote_target_mut(target) {
                *count = count.saturating_sub(1);
            }
        }
        self.upvotes.retain(|(voter, _), _| voter != id);

        let commented: Vec<ContentRef> = self
            .comments
            .iter()
            .filter(|comment| comment.author == *id)
            .map(|comment| comment.target)
            .collect();
        for target in &commented {
            self.adjust_comment_count(target, -1);
        }
        self.comments.retain(|comment| comment.author != *id);

        let owned: Vec<ContentRef> = self
            .reports
            .iter()
            .filter(|report| report.author == *id)
            .map(|report| ContentRef::Report(report.id))
            .chain(
                self.suggestions
                    .iter()
                    .filter(|suggestion| suggestion.author == *id)
                    .map(|suggestion| ContentRef::Suggestion(suggestion.id)),
            )
            .collect();
        for target in &owned {
            self.remove_engagement(target);
        }
        self.reports.retain(|report| report.author != *id);
        self.suggestions.retain(|suggestion| suggestion.author != *id);

        self.notifications
            .retain(|notification| notification.recipient != *id);
        self.users.retain(|stored| stored.user.id() != id);
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut state = self.lock().map_err(UserPersistenceError::query)?;
        let taken = state
            .users
            .iter()
            .any(|stored| stored.user.email().as_ref() == user.email().as_ref());
        if taken {
            return Err(UserPersistenceError::duplicate_email(user.email().as_ref()));
        }
        state.users.push(StoredUser {
            user: user.clone(),
            password_hash: password_hash.clone(),
        });
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state
            .users
            .iter()
            .find(|stored| stored.user.id() == id)
            .map(|stored| stored.user.clone()))
    }

    async fn find_credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state
            .users
            .iter()
            .find(|stored| stored.user.email() == email)
            .map(|stored| UserCredentials {
                user: stored.user.clone(),
                password_hash: stored.password_hash.clone(),
            }))
    }

    async fn list(&self, role: Option<Role>) -> Result<Vec<User>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        let mut users: Vec<User> = state
            .users
            .iter()
            .rev()
            .filter(|stored| role.is_none_or(|role| stored.user.role() == role))
            .map(|stored| stored.user.clone())
            .collect();
        users.sort_by_key(|user| std::cmp::Reverse(user.created_at()));
        Ok(users)
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
        _at: DateTime<Utc>,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut state = self.lock().map_err(UserPersistenceError::query)?;
        let Some(stored) = state.users.iter_mut().find(|stored| stored.user.id() == id) else {
            return Ok(None);
        };
        stored.user = stored.user.clone().apply(update);
        Ok(Some(stored.user.clone()))
    }

    async fn mark_verified(
        &self,
        id: &UserId,
        _at: DateTime<Utc>,
    ) -> Result<Option<bool>, UserPersistenceError> {
        let mut state = self.lock().map_err(UserPersistenceError::query)?;
        let Some(stored) = state.users.iter_mut().find(|stored| stored.user.id() == id) else {
            return Ok(None);
        };
        if stored.user.is_verified() {
            return Ok(Some(false));
        }
        stored.user = stored.user.clone().verified();
        Ok(Some(true))
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut state = self.lock().map_err(UserPersistenceError::query)?;
        if !state.users.iter().any(|stored| stored.user.id() == id) {
            return Ok(false);
        }
        state.remove_user(id);
        Ok(true)
    }
}
