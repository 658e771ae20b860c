//! Test helpers for inbound HTTP components.
//!
//! Handler tests run against the real domain services over the in-memory
//! store, so a request travels the same path it does in production apart
//! from the storage adapter.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use crate::domain::ports::{
    AccessTokenCodec, NoOpNotificationPush, NotificationPush, UserRepository,
};
use crate::domain::{
    AccountService, CommentService, NotificationService, PasswordHash, ReportService, Role,
    SuggestionService, UpvoteService, User,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::InMemoryStore;
use crate::outbound::security::{Argon2PasswordHasher, Hs256TokenCodec};
use crate::test_support::{fixture_clock, user_with_role};

pub(crate) const TEST_SECRET: &[u8] = b"test-secret-with-enough-entropy-for-hs256";

/// In-memory service graph plus the handles tests need to seed data.
pub(crate) struct TestBackend {
    pub store: Arc<InMemoryStore>,
    pub tokens: Arc<Hs256TokenCodec>,
    pub state: HttpState,
}

impl TestBackend {
    pub fn new() -> Self {
        Self::with_push(Arc::new(NoOpNotificationPush))
    }

    /// Build the graph with a custom push adapter.
    pub fn with_push(push: Arc<dyn NotificationPush>) -> Self {
        let clock = fixture_clock();
        let store = Arc::new(InMemoryStore::new());
        let tokens = Arc::new(Hs256TokenCodec::new(
            TEST_SECRET.to_vec(),
            chrono::Duration::hours(24),
            clock.clone(),
        ));
        let notifications = Arc::new(NotificationService::new(store.clone(), push, clock.clone()));
        let accounts = Arc::new(AccountService::new(
            store.clone(),
            Arc::new(Argon2PasswordHasher::new()),
            tokens.clone(),
            notifications.clone(),
            clock.clone(),
        ));
        let reports = Arc::new(ReportService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            notifications.clone(),
            clock.clone(),
        ));
        let suggestions = Arc::new(SuggestionService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            notifications.clone(),
            clock.clone(),
        ));
        let comments = Arc::new(CommentService::new(
            store.clone(),
            store.clone(),
            notifications.clone(),
            clock.clone(),
        ));
        let upvotes = Arc::new(UpvoteService::new(
            store.clone(),
            notifications.clone(),
            clock,
        ));

        let state = HttpState::new(HttpStatePorts {
            accounts: accounts.clone(),
            accounts_query: accounts,
            reports: reports.clone(),
            reports_query: reports,
            suggestions: suggestions.clone(),
            suggestions_query: suggestions,
            comments: comments.clone(),
            comments_query: comments,
            upvotes,
            notifications: notifications.clone(),
            notifications_query: notifications,
        });

        Self {
            store,
            tokens,
            state,
        }
    }

    /// Store an account directly and return it with a valid bearer token.
    pub async fn seed_user(&self, role: Role, email: &str) -> (User, String) {
        let user = user_with_role(role, email);
        UserRepository::insert(
            self.store.as_ref(),
            &user,
            &PasswordHash::new("$argon2id$unused"),
        )
        .await
        .expect("seed user");
        let token = self.token_for(&user);
        (user, token)
    }

    pub fn token_for(&self, user: &User) -> String {
        self.tokens
            .issue(user.id(), user.role())
            .expect("issue token")
    }

    /// Application with the backend state and the `/api` scope built by
    /// `configure`.
    pub fn app<F>(
        &self,
        configure: F,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<F>,
    >
    where
        F: FnOnce(&mut web::ServiceConfig),
    {
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .service(web::scope("/api").configure(configure))
    }
}

/// `Authorization` header value for a token.
pub(crate) fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}
