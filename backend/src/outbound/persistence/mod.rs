//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories translate between Diesel row structs (`models.rs`) and
//! domain values; no business rules live here. Multi-row writes (upvote
//! toggles, comment counters, cascading deletes) each run in a single
//! transaction.
//!
//! # Example
//!
//! ```ignore
//! use communityfix::outbound::persistence::{DbPool, DieselReportRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/communityfix", 10)).await?;
//! let reports = DieselReportRepository::new(pool);
//! ```

mod diesel_comment_repository;
mod diesel_error_mapping;
mod diesel_notification_repository;
mod diesel_report_repository;
mod diesel_suggestion_repository;
mod diesel_upvote_repository;
mod diesel_user_repository;
mod engagement_targets;
mod listing;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_comment_repository::DieselCommentRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_report_repository::DieselReportRepository;
pub use diesel_suggestion_repository::DieselSuggestionRepository;
pub use diesel_upvote_repository::DieselUpvoteRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
