//! Token secret fingerprinting for operational visibility.
//!
//! Operators compare fingerprints across replicas to confirm they share a
//! signing secret without the secret itself appearing in logs.

use sha2::{Digest, Sha256};

/// Length of the fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Truncated SHA-256 of `secret` as 16 lowercase hex characters.
///
/// # Examples
///
/// ```rust
/// use communityfix::inbound::http::auth_config::fingerprint::secret_fingerprint;
///
/// let fp = secret_fingerprint(b"correct horse battery staple");
/// assert_eq!(fp.len(), 16);
/// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn secret_fingerprint(secret: &[u8]) -> String {
    let digest = Sha256::digest(secret);
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn fingerprint_is_deterministic() {
        let secret = [b'a'; 64];
        assert_eq!(secret_fingerprint(&secret), secret_fingerprint(&secret));
    }

    #[rstest]
    fn fingerprint_is_short_lowercase_hex() {
        let fp = secret_fingerprint(b"secret");
        assert_eq!(fp.len(), FINGERPRINT_BYTES * 2);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(fp, fp.to_lowercase());
    }

    #[rstest]
    fn different_secrets_produce_different_fingerprints() {
        assert_ne!(secret_fingerprint(&[b'a'; 64]), secret_fingerprint(&[b'b'; 64]));
    }
}
