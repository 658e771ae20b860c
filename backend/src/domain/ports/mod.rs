//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`NotificationPush`], [`PasswordHasher`],
//! [`AccessTokenCodec`], [`Notifier`]) are implemented by outbound adapters.
//! Driving ports (`*Command`, `*Query`) are implemented by domain services and
//! called by the HTTP and WebSocket adapters.

mod macros;
pub(crate) use macros::define_port_error;

/// Port errors that know which domain error they surface as.
///
/// Implemented by every enum built with `define_port_error!`.
pub trait PortFailure: std::error::Error {
    /// `None` when the calling service must translate the failure itself.
    fn as_domain_error(&self) -> Option<crate::domain::Error>;
}

mod access_token_codec;
mod account_command;
mod account_query;
mod comment_command;
mod comment_query;
mod comment_repository;
mod notification_command;
mod notification_push;
mod notification_query;
mod notification_repository;
mod notifier;
mod password_hasher;
mod report_command;
mod report_query;
mod report_repository;
mod suggestion_command;
mod suggestion_query;
mod suggestion_repository;
mod upvote_command;
mod upvote_repository;
mod user_repository;

#[cfg(test)]
pub use access_token_codec::MockAccessTokenCodec;
pub use access_token_codec::{AccessTokenCodec, AccessTokenError};
#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::{
    AccountCommand, AuthSession, CreateMunicipalityAccountRequest, RegisterRequest,
};
#[cfg(test)]
pub use account_query::MockAccountQuery;
pub use account_query::AccountQuery;
#[cfg(test)]
pub use comment_command::MockCommentCommand;
pub use comment_command::CommentCommand;
#[cfg(test)]
pub use comment_query::MockCommentQuery;
pub use comment_query::CommentQuery;
#[cfg(test)]
pub use comment_repository::MockCommentRepository;
pub use comment_repository::{CommentRepository, CommentRepositoryError};
#[cfg(test)]
pub use notification_command::MockNotificationCommand;
pub use notification_command::NotificationCommand;
#[cfg(test)]
pub use notification_push::MockNotificationPush;
pub use notification_push::{NoOpNotificationPush, NotificationPush, NotificationPushError};
#[cfg(test)]
pub use notification_query::MockNotificationQuery;
pub use notification_query::NotificationQuery;
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{NotificationRepository, NotificationRepositoryError};
#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::{NoOpNotifier, Notifier};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use report_command::MockReportCommand;
pub use report_command::ReportCommand;
#[cfg(test)]
pub use report_query::MockReportQuery;
pub use report_query::ReportQuery;
#[cfg(test)]
pub use report_repository::MockReportRepository;
pub use report_repository::{ReportRepository, ReportRepositoryError};
#[cfg(test)]
pub use suggestion_command::MockSuggestionCommand;
pub use suggestion_command::SuggestionCommand;
#[cfg(test)]
pub use suggestion_query::MockSuggestionQuery;
pub use suggestion_query::SuggestionQuery;
#[cfg(test)]
pub use suggestion_repository::MockSuggestionRepository;
pub use suggestion_repository::{SuggestionRepository, SuggestionRepositoryError};
#[cfg(test)]
pub use upvote_command::MockUpvoteCommand;
pub use upvote_command::UpvoteCommand;
#[cfg(test)]
pub use upvote_repository::MockUpvoteRepository;
pub use upvote_repository::{UpvoteRepository, UpvoteRepositoryError, UpvoteState, UpvoteToggle};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserCredentials, UserPersistenceError, UserRepository};
