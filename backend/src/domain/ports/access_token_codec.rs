//! Port for issuing and verifying bearer access tokens.

use crate::domain::{AccessClaims, Role, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised while issuing or verifying tokens.
    pub enum AccessTokenError {
        /// The token is not structurally valid.
        Malformed => "access token is malformed",
        /// The signature does not match.
        InvalidSignature => "access token signature is invalid",
        /// The token has expired.
        Expired => "access token has expired",
        /// Claims could not be encoded.
        Encoding { message: String } => "access token encoding failed: {message}" as internal,
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait AccessTokenCodec: Send + Sync {
    /// Sign a token for `subject`.
    fn issue(&self, subject: &UserId, role: Role) -> Result<String, AccessTokenError>;

    /// Check signature and expiry, returning the claims.
    fn verify(&self, token: &str) -> Result<AccessClaims, AccessTokenError>;
}
