//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed entities shared by the HTTP, WebSocket and
//! persistence adapters, and the services that implement the driving ports.
//! Keep types immutable where possible and document invariants on each type.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifier.
//! - User, Role, Actor: accounts and the authenticated caller.
//! - Report, Suggestion, Comment: civic content.
//! - Notification, CivicEvent: per-user notifications and the events that
//!   raise them.

pub mod auth;
pub mod civic_events;
pub mod comment;
pub mod content;
pub mod error;
pub mod identifiers;
pub mod notification;
pub mod ports;
pub mod report;
pub mod suggestion;
pub mod trace_id;
pub mod user;

mod account_service;
mod comment_service;
mod notification_service;
mod report_service;
mod service_support;
mod suggestion_service;
mod upvote_service;

pub use self::account_service::AccountService;
pub use self::auth::{
    AccessClaims, Actor, CredentialsValidationError, LoginCredentials, NewPassword,
    PASSWORD_MIN_LEN, PasswordHash,
};
pub use self::civic_events::CivicEvent;
pub use self::comment::{COMMENT_MAX, Comment, CommentBody};
pub use self::comment_service::CommentService;
pub use self::content::{
    ContentFilter, ContentKind, ContentRef, ContentSort, ContentStatus, ContentValidationError,
    DEFAULT_PAGE_LIMIT, Jurisdiction, MAX_PAGE_LIMIT, PageRequest, authorize_status_change,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::identifiers::{CommentId, NotificationId, ReportId, SuggestionId};
pub use self::notification::{
    MarkAllReadOutcome, Notification, NotificationDraft, NotificationKind,
    UnknownNotificationKind,
};
pub use self::notification_service::NotificationService;
pub use self::report::{GeoPoint, MAX_PHOTOS, NewReport, Report, ReportDetail};
pub use self::report_service::ReportService;
pub use self::suggestion::{NewSuggestion, Suggestion, SuggestionDetail};
pub use self::suggestion_service::SuggestionService;
pub use self::trace_id::TraceId;
pub use self::upvote_service::UpvoteService;
pub use self::user::{
    Email, FullName, ProfileUpdate, Role, User, UserDraft, UserId, UserValidationError,
    validate_phone,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use communityfix::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
