//! Server settings loaded via OrthoConfig and the resolved runtime config.

use std::net::SocketAddr;

use communityfix::inbound::http::auth_config::TokenSettings;
use communityfix::inbound::ws::origin::OriginAllowList;
use communityfix::outbound::persistence::{DbPool, PoolConfig};
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";

/// Values controlling how the server binds and what it connects to.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "COMMUNITYFIX")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Maximum number of pooled database connections.
    pub db_pool_size: Option<u32>,
    /// Comma-separated origins allowed to open notification sockets.
    pub allowed_origins: Option<String>,
}

/// Invalid server settings.
#[derive(Debug, thiserror::Error)]
pub enum ServerSettingsError {
    #[error("invalid bind address `{value}`: {message}")]
    BindAddr { value: String, message: String },
    #[error("invalid allowed origin list `{value}`: {message}")]
    Origins { value: String, message: String },
    #[error("database pool size must be at least 1")]
    PoolSize,
}

impl ServerSettings {
    /// Listen address, falling back to all interfaces on port 8080.
    pub fn bind_addr(&self) -> Result<SocketAddr, ServerSettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| {
            ServerSettingsError::BindAddr {
                value: raw.to_owned(),
                message: err.to_string(),
            }
        })
    }

    /// Pool configuration when a database URL is set.
    pub fn pool_config(&self) -> Result<Option<PoolConfig>, ServerSettingsError> {
        let Some(url) = self.database_url.as_deref().filter(|url| !url.trim().is_empty()) else {
            return Ok(None);
        };
        let size = self.db_pool_size.unwrap_or(DEFAULT_POOL_SIZE);
        if size == 0 {
            return Err(ServerSettingsError::PoolSize);
        }
        Ok(Some(PoolConfig::new(url, size)))
    }

    /// Origin allow-list for the WebSocket upgrade.
    pub fn origin_allow_list(&self) -> Result<OriginAllowList, ServerSettingsError> {
        let raw = self
            .allowed_origins
            .as_deref()
            .unwrap_or(DEFAULT_ALLOWED_ORIGIN);
        OriginAllowList::parse(raw.split(',').map(str::trim).filter(|s| !s.is_empty())).map_err(
            |err| ServerSettingsError::Origins {
                value: raw.to_owned(),
                message: err.to_string(),
            },
        )
    }
}

/// Fully resolved configuration for [`super::create_server`].
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) origins: OriginAllowList,
    pub(crate) tokens: TokenSettings,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, origins: OriginAllowList, tokens: TokenSettings) -> Self {
        Self {
            bind_addr,
            origins,
            tokens,
            db_pool: None,
        }
    }

    /// Attach a database connection pool for the Diesel repositories.
    ///
    /// Without one the server keeps all state in process memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
