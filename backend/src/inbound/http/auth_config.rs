//! Bearer token configuration parsing and validation.
//!
//! Reads the token signing secret and lifetime from the environment so they
//! are validated consistently and can be tested in isolation.

pub mod fingerprint;

use chrono::Duration;
use mockable::Env;
use tracing::{info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use self::fingerprint::secret_fingerprint;

const SECRET_ENV: &str = "JWT_SECRET";
const TTL_ENV: &str = "JWT_TTL_HOURS";
const SECRET_MIN_LEN: usize = 32;
const DEFAULT_TTL_HOURS: i64 = 24;
const MAX_TTL_HOURS: i64 = 24 * 30;
const TTL_EXPECTED: &str = "whole hours between 1 and 720";

/// Build mode for token configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate a missing secret and fall back to an ephemeral one.
    Debug,
    /// Release builds require an explicit, sufficiently long secret.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use communityfix::inbound::http::auth_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Token settings derived from the environment.
pub struct TokenSettings {
    secret: Zeroizing<Vec<u8>>,
    /// Lifetime of issued tokens.
    pub ttl: Duration,
    /// True when the secret was generated for this process only.
    pub ephemeral: bool,
}

impl TokenSettings {
    /// Signing secret bytes.
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    /// Short, non-reversible identifier of the active secret.
    pub fn fingerprint(&self) -> String {
        secret_fingerprint(&self.secret)
    }
}

/// Errors raised while validating token configuration.
#[derive(thiserror::Error, Debug)]
pub enum AuthConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// The secret is shorter than release builds accept.
    #[error("JWT_SECRET too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort { length: usize, min_len: usize },
}

/// Build token settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use communityfix::inbound::http::auth_config::{BuildMode, token_settings_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "JWT_SECRET" => Some("x".repeat(48)),
///     "JWT_TTL_HOURS" => Some("12".to_owned()),
///     _ => None,
/// });
///
/// let settings = token_settings_from_env(&env, BuildMode::Release).expect("valid settings");
/// assert_eq!(settings.ttl, chrono::Duration::hours(12));
/// assert!(!settings.ephemeral);
/// ```
pub fn token_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<TokenSettings, AuthConfigError> {
    let ttl = ttl_from_env(env, mode)?;
    let (secret, ephemeral) = secret_from_env(env, mode)?;
    let settings = TokenSettings {
        secret,
        ttl,
        ephemeral,
    };
    info!(
        fingerprint = %settings.fingerprint(),
        ttl_hours = settings.ttl.num_hours(),
        ephemeral,
        "token signing configured"
    );
    Ok(settings)
}

fn ttl_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Duration, AuthConfigError> {
    let Some(value) = env.string(TTL_ENV) else {
        return Ok(Duration::hours(DEFAULT_TTL_HOURS));
    };
    match value.trim().parse::<i64>() {
        Ok(hours) if (1..=MAX_TTL_HOURS).contains(&hours) => Ok(Duration::hours(hours)),
        _ if mode.is_debug() => {
            warn!(value = %value, "invalid JWT_TTL_HOURS; using default");
            Ok(Duration::hours(DEFAULT_TTL_HOURS))
        }
        _ => Err(AuthConfigError::InvalidEnv {
            name: TTL_ENV,
            value,
            expected: TTL_EXPECTED,
        }),
    }
}

fn secret_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<(Zeroizing<Vec<u8>>, bool), AuthConfigError> {
    let provided = env
        .string(SECRET_ENV)
        .map(|raw| Zeroizing::new(raw.into_bytes()))
        .filter(|bytes| !bytes.is_empty());

    match provided {
        Some(secret) if secret.len() >= SECRET_MIN_LEN => Ok((secret, false)),
        Some(secret) if mode.is_debug() => {
            warn!(
                length = secret.len(),
                min_len = SECRET_MIN_LEN,
                "JWT_SECRET shorter than recommended (dev only)"
            );
            Ok((secret, false))
        }
        Some(secret) => Err(AuthConfigError::SecretTooShort {
            length: secret.len(),
            min_len: SECRET_MIN_LEN,
        }),
        None if mode.is_debug() => {
            warn!("JWT_SECRET not set; using ephemeral secret (dev only)");
            Ok((ephemeral_secret(), true))
        }
        None => Err(AuthConfigError::MissingEnv { name: SECRET_ENV }),
    }
}

/// 32 random bytes; tokens signed with it die with the process.
fn ephemeral_secret() -> Zeroizing<Vec<u8>> {
    let mut bytes = Zeroizing::new(Vec::with_capacity(SECRET_MIN_LEN));
    bytes.extend_from_slice(Uuid::new_v4().as_bytes());
    bytes.extend_from_slice(Uuid::new_v4().as_bytes());
    bytes
}
