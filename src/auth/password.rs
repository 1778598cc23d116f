use std::fmt;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Password view denied.")]
    ViewDenied,
    #[error("password hashing failed: {0}")]
    Hash(String),
}

pub fn hash_password(plain: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            CredentialError::Hash(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Returns false for a wrong password and also for a stored hash that does not parse.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "stored password hash is malformed");
            return false;
        }
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

/// A stored password hash. It can be set from plaintext and checked against
/// plaintext; its contents are never handed back out of the auth module.
#[derive(Clone, Default)]
pub struct PasswordDigest {
    encoded: Option<String>,
}

impl PasswordDigest {
    pub fn from_plaintext(plain: &str) -> Result<Self, CredentialError> {
        let mut digest = Self::default();
        digest.set(plain)?;
        Ok(digest)
    }

    pub fn set(&mut self, plain: &str) -> Result<(), CredentialError> {
        self.encoded = Some(hash_password(plain)?);
        Ok(())
    }

    pub fn verify(&self, plain: &str) -> bool {
        match &self.encoded {
            Some(hash) => verify_password(plain, hash),
            None => false,
        }
    }

    pub(in crate::auth) fn from_stored(encoded: Option<String>) -> Self {
        Self { encoded }
    }

    pub(in crate::auth) fn stored(&self) -> Option<&str> {
        self.encoded.as_deref()
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}
