//! Credential adapters: password hashing and bearer token signing.

mod argon2_password_hasher;
mod hs256_token_codec;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use hs256_token_codec::Hs256TokenCodec;
