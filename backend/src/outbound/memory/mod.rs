//! In-process implementations of the repository ports.
//!
//! [`InMemoryStore`] keeps every table behind one mutex, so multi-row
//! operations such as the upvote toggle or comment-count maintenance are
//! atomic in the same way the PostgreSQL adapters make them atomic with
//! transactions. The server falls back to this store when no database URL
//! is configured; it is also the backing store for handler tests.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};

use crate::domain::{
    Comment, ContentFilter, ContentRef, ContentSort, ContentStatus, Jurisdiction, Notification,
    PageRequest, PasswordHash, Report, Suggestion, User, UserId,
};

mod content;
mod engagement;
mod notifications;
mod users;

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: PasswordHash,
}

/// Rows in insertion order; listing sorts are stable over this order.
#[derive(Debug, Default)]
struct State {
    users: Vec<StoredUser>,
    reports: Vec<Report>,
    suggestions: Vec<Suggestion>,
    comments: Vec<Comment>,
    /// Upvote rows keyed by voter and target, valued by when they were cast.
    upvotes: HashMap<(UserId, ContentRef), DateTime<Utc>>,
    notifications: Vec<Notification>,
}

impl State {
    /// Author and mutable upvote count of a report or suggestion.
    fn upvote_target_mut(&mut self, target: &ContentRef) -> Option<(UserId, &mut u32)> {
        match target {
            ContentRef::Report(id) => self
                .reports
                .iter_mut()
                .find(|report| report.id == *id)
                .map(|report| (report.author.clone(), &mut report.upvote_count)),
            ContentRef::Suggestion(id) => self
                .suggestions
                .iter_mut()
                .find(|suggestion| suggestion.id == *id)
                .map(|suggestion| (suggestion.author.clone(), &mut suggestion.upvote_count)),
        }
    }

    fn target_author(&self, target: &ContentRef) -> Option<UserId> {
        match target {
            ContentRef::Report(id) => self
                .reports
                .iter()
                .find(|report| report.id == *id)
                .map(|report| report.author.clone()),
            ContentRef::Suggestion(id) => self
                .suggestions
                .iter()
                .find(|suggestion| suggestion.id == *id)
                .map(|suggestion| suggestion.author.clone()),
        }
    }

    fn adjust_comment_count(&mut self, target: &ContentRef, delta: i64) {
        let ContentRef::Suggestion(id) = target else {
            return;
        };
        if let Some(suggestion) = self.suggestions.iter_mut().find(|s| s.id == *id) {
            suggestion.comment_count = apply_delta(suggestion.comment_count, delta);
        }
    }

    /// Remove comments and upvotes attached to deleted content.
    fn remove_engagement(&mut self, target: &ContentRef) {
        self.comments.retain(|comment| comment.target != *target);
        self.upvotes.retain(|(_, upvoted), _| upvoted != target);
    }
}

fn apply_delta(value: u32, delta: i64) -> u32 {
    let next = i64::from(value).saturating_add(delta).max(0);
    u32::try_from(next).unwrap_or(u32::MAX)
}

/// Thread-safe in-memory store implementing every repository port.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails once a writer has panicked while holding the lock.
    fn lock(&self) -> Result<MutexGuard<'_, State>, String> {
        self.state
            .lock()
            .map_err(|_| "in-memory store lock poisoned".to_owned())
    }
}

/// Fields shared by reports and suggestions for filtering and sorting.
trait Listable: Clone {
    fn status(&self) -> ContentStatus;
    fn jurisdiction(&self) -> &Jurisdiction;
    fn author(&self) -> &UserId;
    fn upvote_count(&self) -> u32;
    fn created_at(&self) -> DateTime<Utc>;
}

impl Listable for Report {
    fn status(&self) -> ContentStatus {
        self.status
    }
    fn jurisdiction(&self) -> &Jurisdiction {
        &self.jurisdiction
    }
    fn author(&self) -> &UserId {
        &self.author
    }
    fn upvote_count(&self) -> u32 {
        self.upvote_count
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Listable for Suggestion {
    fn status(&self) -> ContentStatus {
        self.status
    }
    fn jurisdiction(&self) -> &Jurisdiction {
        &self.jurisdiction
    }
    fn author(&self) -> &UserId {
        &self.author
    }
    fn upvote_count(&self) -> u32 {
        self.upvote_count
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

fn matches_filter<T: Listable>(item: &T, filter: &ContentFilter) -> bool {
    let jurisdiction = item.jurisdiction();
    filter.status.is_none_or(|status| item.status() == status)
        && filter
            .municipality
            .as_deref()
            .is_none_or(|m| jurisdiction.municipality().eq_ignore_ascii_case(m))
        && filter
            .ward
            .as_deref()
            .is_none_or(|w| jurisdiction.ward().eq_ignore_ascii_case(w))
        && filter.author.as_ref().is_none_or(|author| item.author() == author)
}

fn list_content<T: Listable>(items: &[T], filter: &ContentFilter) -> Vec<T> {
    let mut selected: Vec<T> = items
        .iter()
        .rev()
        .filter(|item| matches_filter(*item, filter))
        .cloned()
        .collect();
    match filter.sort {
        ContentSort::Newest => selected.sort_by_key(|item| std::cmp::Reverse(item.created_at())),
        ContentSort::Oldest => {
            selected.reverse();
            selected.sort_by_key(|item| item.created_at());
        }
        ContentSort::MostUpvoted => {
            selected.sort_by_key(|item| std::cmp::Reverse(item.created_at()));
            selected.sort_by_key(|item| std::cmp::Reverse(item.upvote_count()));
        }
    }
    paginate(selected, &filter.page)
}

fn paginate<T>(items: Vec<T>, page: &PageRequest) -> Vec<T> {
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    items.into_iter().skip(offset).take(limit).collect()
}
