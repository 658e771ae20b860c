//! Argon2id implementation of the `PasswordHasher` port.

use argon2::Argon2;
use argon2::password_hash::{
    Error as PhcError, PasswordHash as PhcString, PasswordHasher as _, PasswordVerifier,
    SaltString,
};
use async_trait::async_trait;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHasher, PasswordHasherError};
use crate::domain::{NewPassword, PasswordHash};

/// Argon2id hasher with the crate's default parameters.
///
/// Hashing is CPU-bound, so both operations run on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

/// 16 bytes from the operating system RNG, as drawn for v4 UUIDs.
fn random_salt() -> Result<SaltString, PasswordHasherError> {
    SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|err| PasswordHasherError::hash(err.to_string()))
}

fn hash_blocking(password: &str) -> Result<PasswordHash, PasswordHasherError> {
    let salt = random_salt()?;
    let encoded = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| PasswordHasherError::hash(err.to_string()))?;
    Ok(PasswordHash::new(encoded.to_string()))
}

fn verify_blocking(password: &str, encoded: &str) -> Result<bool, PasswordHasherError> {
    let parsed =
        PhcString::new(encoded).map_err(|err| PasswordHasherError::invalid_hash(err.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PhcError::Password) => Ok(false),
        Err(err) => Err(PasswordHasherError::invalid_hash(err.to_string())),
    }
}

fn join_error(err: tokio::task::JoinError) -> PasswordHasherError {
    PasswordHasherError::hash(format!("hashing task failed: {err}"))
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &NewPassword) -> Result<PasswordHash, PasswordHasherError> {
        let secret = Zeroizing::new(password.expose().to_owned());
        tokio::task::spawn_blocking(move || hash_blocking(&secret))
            .await
            .map_err(join_error)?
    }

    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        let secret = Zeroizing::new(password.to_owned());
        let encoded = hash.as_ref().to_owned();
        tokio::task::spawn_blocking(move || verify_blocking(&secret, &encoded))
            .await
            .map_err(join_error)?
    }
}
