//! HS256-signed bearer tokens in compact JWT form.
//!
//! Tokens are `base64url(header).base64url(claims).base64url(signature)`
//! with an HMAC-SHA256 signature over the first two segments. Only the
//! `HS256` algorithm is accepted on verification.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Duration;
use hmac::{Hmac, Mac};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::domain::ports::{AccessTokenCodec, AccessTokenError};
use crate::domain::{AccessClaims, Role, UserId};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct Header<'a> {
    alg: &'a str,
    typ: &'a str,
}

const HEADER: Header<'static> = Header {
    alg: "HS256",
    typ: "JWT",
};

/// Token codec signing claims with a shared secret.
pub struct Hs256TokenCodec {
    secret: Zeroizing<Vec<u8>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl Hs256TokenCodec {
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
            ttl,
            clock,
        }
    }

    fn mac(&self) -> Result<HmacSha256, AccessTokenError> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|err| AccessTokenError::encoding(err.to_string()))
    }
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, AccessTokenError> {
    let bytes =
        serde_json::to_vec(value).map_err(|err| AccessTokenError::encoding(err.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, AccessTokenError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AccessTokenError::malformed())
}

fn split_token(token: &str) -> Result<(&str, &str, &str), AccessTokenError> {
    let mut parts = token.trim().split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(claims), Some(signature), None)
            if !header.is_empty() && !claims.is_empty() && !signature.is_empty() =>
        {
            Ok((header, claims, signature))
        }
        _ => Err(AccessTokenError::malformed()),
    }
}

impl AccessTokenCodec for Hs256TokenCodec {
    fn issue(&self, subject: &UserId, role: Role) -> Result<String, AccessTokenError> {
        let claims = AccessClaims::issue(subject.clone(), role, self.clock.utc(), self.ttl);
        let signing_input = format!("{}.{}", encode_segment(&HEADER)?, encode_segment(&claims)?);
        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{signing_input}.{signature}"))
    }

    fn verify(&self, token: &str) -> Result<AccessClaims, AccessTokenError> {
        let (header_part, claims_part, signature_part) = split_token(token)?;

        let header_bytes = decode_segment(header_part)?;
        let header: Header<'_> =
            serde_json::from_slice(&header_bytes).map_err(|_| AccessTokenError::malformed())?;
        if header.alg != HEADER.alg {
            return Err(AccessTokenError::invalid_signature());
        }

        let signature = decode_segment(signature_part)?;
        let mut mac = self.mac()?;
        mac.update(header_part.as_bytes());
        mac.update(b".");
        mac.update(claims_part.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AccessTokenError::invalid_signature())?;

        let claims: AccessClaims = serde_json::from_slice(&decode_segment(claims_part)?)
            .map_err(|_| AccessTokenError::malformed())?;
        if claims.is_expired_at(self.clock.utc()) {
            return Err(AccessTokenError::expired());
        }
        Ok(claims)
    }
}
