//! HTTP inbound adapter exposing REST endpoints.

pub mod accounts;
pub mod auth;
pub mod auth_config;
pub mod comments;
pub mod content;
pub mod error;
pub mod health;
pub mod notifications;
pub mod reports;
pub mod schemas;
pub mod state;
pub mod suggestions;
#[cfg(test)]
pub mod test_utils;
pub mod upvotes;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register every REST scope under the caller's `/api` scope.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    accounts::routes(cfg);
    reports::routes(cfg);
    suggestions::routes(cfg);
    comments::routes(cfg);
    upvotes::routes(cfg);
    notifications::routes(cfg);
}
