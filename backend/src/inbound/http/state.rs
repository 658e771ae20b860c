//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, AccountQuery, CommentCommand, CommentQuery, NotificationCommand,
    NotificationQuery, ReportCommand, ReportQuery, SuggestionCommand, SuggestionQuery,
    UpvoteCommand,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn AccountCommand>,
    pub accounts_query: Arc<dyn AccountQuery>,
    pub reports: Arc<dyn ReportCommand>,
    pub reports_query: Arc<dyn ReportQuery>,
    pub suggestions: Arc<dyn SuggestionCommand>,
    pub suggestions_query: Arc<dyn SuggestionQuery>,
    pub comments: Arc<dyn CommentCommand>,
    pub comments_query: Arc<dyn CommentQuery>,
    pub upvotes: Arc<dyn UpvoteCommand>,
    pub notifications: Arc<dyn NotificationCommand>,
    pub notifications_query: Arc<dyn NotificationQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub accounts_query: Arc<dyn AccountQuery>,
    pub reports: Arc<dyn ReportCommand>,
    pub reports_query: Arc<dyn ReportQuery>,
    pub suggestions: Arc<dyn SuggestionCommand>,
    pub suggestions_query: Arc<dyn SuggestionQuery>,
    pub comments: Arc<dyn CommentCommand>,
    pub comments_query: Arc<dyn CommentQuery>,
    pub upvotes: Arc<dyn UpvoteCommand>,
    pub notifications: Arc<dyn NotificationCommand>,
    pub notifications_query: Arc<dyn NotificationQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// Services usually implement both halves of a command/query pair, so
    /// the same `Arc` is commonly passed twice.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use communityfix::domain::ports::{NoOpNotificationPush, NoOpNotifier};
    /// use communityfix::domain::{
    ///     AccountService, CommentService, NotificationService, ReportService, SuggestionService,
    ///     UpvoteService,
    /// };
    /// use communityfix::inbound::http::state::{HttpState, HttpStatePorts};
    /// use communityfix::outbound::memory::InMemoryStore;
    /// use communityfix::outbound::security::{Argon2PasswordHasher, Hs256TokenCodec};
    /// use mockable::DefaultClock;
    ///
    /// let store = Arc::new(InMemoryStore::new());
    /// let clock = Arc::new(DefaultClock);
    /// let notifier = Arc::new(NoOpNotifier);
    /// let tokens = Arc::new(Hs256TokenCodec::new(
    ///     b"a-long-development-secret".to_vec(),
    ///     chrono::Duration::hours(24),
    ///     clock.clone(),
    /// ));
    /// let accounts = Arc::new(AccountService::new(
    ///     store.clone(),
    ///     Arc::new(Argon2PasswordHasher::new()),
    ///     tokens,
    ///     notifier.clone(),
    ///     clock.clone(),
    /// ));
    /// let reports = Arc::new(ReportService::new(
    ///     store.clone(),
    ///     store.clone(),
    ///     store.clone(),
    ///     notifier.clone(),
    ///     clock.clone(),
    /// ));
    /// let suggestions = Arc::new(SuggestionService::new(
    ///     store.clone(),
    ///     store.clone(),
    ///     store.clone(),
    ///     notifier.clone(),
    ///     clock.clone(),
    /// ));
    /// let comments = Arc::new(CommentService::new(
    ///     store.clone(),
    ///     store.clone(),
    ///     notifier.clone(),
    ///     clock.clone(),
    /// ));
    /// let upvotes = Arc::new(UpvoteService::new(store.clone(), notifier, clock.clone()));
    /// let notifications = Arc::new(NotificationService::new(
    ///     store,
    ///     Arc::new(NoOpNotificationPush),
    ///     clock,
    /// ));
    ///
    /// let state = HttpState::new(HttpStatePorts {
    ///     accounts: accounts.clone(),
    ///     accounts_query: accounts,
    ///     reports: reports.clone(),
    ///     reports_query: reports,
    ///     suggestions: suggestions.clone(),
    ///     suggestions_query: suggestions,
    ///     comments: comments.clone(),
    ///     comments_query: comments,
    ///     upvotes,
    ///     notifications: notifications.clone(),
    ///     notifications_query: notifications,
    /// });
    /// let _query = state.notifications_query.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            accounts,
            accounts_query,
            reports,
            reports_query,
            suggestions,
            suggestions_query,
            comments,
            comments_query,
            upvotes,
            notifications,
            notifications_query,
        } = ports;
        Self {
            accounts,
            accounts_query,
            reports,
            reports_query,
            suggestions,
            suggestions_query,
            comments,
            comments_query,
            upvotes,
            notifications,
            notifications_query,
        }
    }
}
