//! # roomhub-adapter-auth-argon2
//!
//! Argon2id implementation of the [`PasswordHasher`] port.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$...`), so the salt and
//! parameters travel with the hash and verification needs nothing else.
//!
//! ## Dependency rule
//! Depends on `roomhub-app` (for the port trait) and `roomhub-domain` (for errors).

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordVerifier};

use roomhub_app::ports::PasswordHasher;
use roomhub_domain::error::HubError;

/// Errors raised while hashing or parsing a stored hash.
#[derive(Debug, thiserror::Error)]
pub enum HashingError {
    #[error("password hashing failed")]
    Hash(#[source] argon2::password_hash::Error),

    #[error("stored password hash is malformed")]
    MalformedHash(#[source] argon2::password_hash::Error),
}

impl From<HashingError> for HubError {
    fn from(err: HashingError) -> Self {
        Self::Hashing(Box::new(err))
    }
}

/// Argon2id hasher with the crate's default parameters.
#[derive(Default)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Create a hasher with default Argon2id parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, HubError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = argon2::PasswordHasher::hash_password(&self.argon2, password.as_bytes(), &salt)
            .map_err(HashingError::Hash)?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, HubError> {
        let parsed = PasswordHash::new(hash).map_err(HashingError::MalformedHash)?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(HashingError::Hash(err).into()),
        }
    }
}
