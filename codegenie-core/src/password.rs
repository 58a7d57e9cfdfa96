//! Password hashing.
//!
//! New hashes are Argon2 PHC strings. Older credential files hold
//! unsalted SHA-256 hex digests; those still verify, and
//! [`needs_rehash`] tells the caller to upgrade them.

use crate::error::{self, Error, ErrorKind, Result};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use tracing::error;

pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            Error::new(ErrorKind::Unexpected, "failed to hash password")
                .with_operation("password::hash")
                .with_context("reason", e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> Result<bool> {
    if is_legacy_hash(hash) {
        return Ok(legacy_digest(plain).eq_ignore_ascii_case(hash));
    }

    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        error::parse_error("stored password hash is malformed")
            .with_operation("password::verify")
            .with_context("reason", e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// True when the stored hash predates Argon2 and should be replaced.
pub fn needs_rehash(hash: &str) -> bool {
    is_legacy_hash(hash)
}

fn is_legacy_hash(hash: &str) -> bool {
    hash.len() == 64 && hash.bytes().all(|b| b.is_ascii_hexdigit())
}

fn legacy_digest(plain: &str) -> String {
    hex::encode(Sha256::digest(plain.as_bytes()))
}
