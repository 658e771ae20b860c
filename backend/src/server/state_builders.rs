//! Builders wiring repositories into the domain services behind the HTTP and
//! WebSocket state.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use communityfix::domain::ports::{
    CommentRepository, NotificationPush, NotificationRepository, ReportRepository,
    SuggestionRepository, UpvoteRepository, UserRepository,
};
use communityfix::domain::{
    AccountService, CommentService, NotificationService, ReportService, SuggestionService,
    UpvoteService,
};
use communityfix::inbound::http::state::{HttpState, HttpStatePorts};
use communityfix::inbound::ws::hub::ConnectionHub;
use communityfix::inbound::ws::state::WsState;
use communityfix::outbound::memory::InMemoryStore;
use communityfix::outbound::persistence::{
    DieselCommentRepository, DieselNotificationRepository, DieselReportRepository,
    DieselSuggestionRepository, DieselUpvoteRepository, DieselUserRepository,
};
use communityfix::outbound::security::{Argon2PasswordHasher, Hs256TokenCodec};

use super::ServerConfig;

/// One adapter per repository port.
struct Repositories<U, R, S, C, V, N> {
    users: Arc<U>,
    reports: Arc<R>,
    suggestions: Arc<S>,
    comments: Arc<C>,
    upvotes: Arc<V>,
    notifications: Arc<N>,
}

/// Adapter state shared by every worker.
pub(crate) struct AppStates {
    pub http: HttpState,
    pub ws: WsState,
}

fn wire<U, R, S, C, V, N>(
    repos: Repositories<U, R, S, C, V, N>,
    config: &ServerConfig,
    hub: Arc<ConnectionHub>,
) -> AppStates
where
    U: UserRepository + 'static,
    R: ReportRepository + 'static,
    S: SuggestionRepository + 'static,
    C: CommentRepository + 'static,
    V: UpvoteRepository + 'static,
    N: NotificationRepository + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let push: Arc<dyn NotificationPush> = hub.clone();
    let tokens = Arc::new(Hs256TokenCodec::new(
        config.tokens.secret().to_vec(),
        config.tokens.ttl,
        clock.clone(),
    ));

    let notifications = Arc::new(NotificationService::new(
        repos.notifications,
        push,
        clock.clone(),
    ));
    let accounts = Arc::new(AccountService::new(
        repos.users.clone(),
        Arc::new(Argon2PasswordHasher::new()),
        tokens,
        notifications.clone(),
        clock.clone(),
    ));
    let reports = Arc::new(ReportService::new(
        repos.reports,
        repos.users.clone(),
        repos.upvotes.clone(),
        notifications.clone(),
        clock.clone(),
    ));
    let suggestions = Arc::new(SuggestionService::new(
        repos.suggestions,
        repos.users.clone(),
        repos.upvotes.clone(),
        notifications.clone(),
        clock.clone(),
    ));
    let comments = Arc::new(CommentService::new(
        repos.comments,
        repos.users,
        notifications.clone(),
        clock.clone(),
    ));
    let upvotes = Arc::new(UpvoteService::new(
        repos.upvotes,
        notifications.clone(),
        clock,
    ));

    let ws = WsState::new(
        accounts.clone(),
        notifications.clone(),
        notifications.clone(),
        hub,
        config.origins.clone(),
    );
    let http = HttpState::new(HttpStatePorts {
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

    AppStates { http, ws }
}

/// Build both adapter states, choosing Diesel repositories when a pool is
/// configured and the in-memory store otherwise.
pub(crate) fn build_states(config: &ServerConfig, hub: Arc<ConnectionHub>) -> AppStates {
    match &config.db_pool {
        Some(pool) => wire(
            Repositories {
                users: Arc::new(DieselUserRepository::new(pool.clone())),
                reports: Arc::new(DieselReportRepository::new(pool.clone())),
                suggestions: Arc::new(DieselSuggestionRepository::new(pool.clone())),
                comments: Arc::new(DieselCommentRepository::new(pool.clone())),
                upvotes: Arc::new(DieselUpvoteRepository::new(pool.clone())),
                notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
            },
            config,
            hub,
        ),
        None => {
            let store = Arc::new(InMemoryStore::new());
            wire(
                Repositories {
                    users: store.clone(),
                    reports: store.clone(),
                    suggestions: store.clone(),
                    comments: store.clone(),
                    upvotes: store.clone(),
                    notifications: store,
                },
                config,
                hub,
            )
        }
    }
}
