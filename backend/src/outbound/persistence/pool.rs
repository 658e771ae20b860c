//! bb8 pool of async PostgreSQL connections shared by the repositories.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(30);
const WARM_CONNECTIONS: u32 = 2;

/// The pool could not be built, or no connection freed up in time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("database pool {stage} failed: {message}")]
pub struct PoolError {
    stage: &'static str,
    message: String,
}

impl PoolError {
    fn build(message: impl Into<String>) -> Self {
        Self {
            stage: "startup",
            message: message.into(),
        }
    }

    pub(crate) fn checkout(message: impl Into<String>) -> Self {
        Self {
            stage: "checkout",
            message: message.into(),
        }
    }

    /// Driver message without the stage prefix.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Database location and pool size resolved from the server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
}

impl PoolConfig {
    /// `max_size` is validated as non-zero by the settings loader.
    pub fn new(database_url: impl Into<String>, max_size: u32) -> Self {
        Self {
            database_url: database_url.into(),
            max_size,
        }
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    /// Connections kept open between requests; never more than the pool holds.
    fn min_idle(&self) -> u32 {
        self.max_size.min(WARM_CONNECTIONS)
    }
}

/// Cloneable handle; every repository holds one.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Open the pool and its warm connections.
    ///
    /// # Errors
    ///
    /// Fails when the URL is invalid or PostgreSQL refuses the first
    /// connections.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.database_url());
        let inner = Pool::builder()
            .max_size(config.max_size)
            .min_idle(Some(config.min_idle()))
            .connection_timeout(CHECKOUT_TIMEOUT)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;
        Ok(Self { inner })
    }

    /// Borrow a connection, waiting at most thirty seconds.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(1, 1)]
    #[case(2, 2)]
    #[case(10, 2)]
    fn warm_connections_never_exceed_the_pool(#[case] size: u32, #[case] idle: u32) {
        assert_eq!(PoolConfig::new("postgres://db/communityfix", size).min_idle(), idle);
    }

    #[rstest]
    fn errors_name_the_failing_stage() {
        let startup = PoolError::build("invalid connection string");
        let checkout = PoolError::checkout("timed out");

        assert_eq!(
            startup.to_string(),
            "database pool startup failed: invalid connection string"
        );
        assert_eq!(checkout.message(), "timed out");
    }
}
