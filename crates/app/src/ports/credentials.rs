//! Credentials port: one-way password hashing.

use roomhub_domain::error::HubError;

/// Hashes and verifies user passwords. Implementations are synchronous.
pub trait PasswordHasher {
    /// Hash `password` into a self-describing PHC string.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Hashing`] when the hasher fails.
    fn hash(&self, password: &str) -> Result<String, HubError>;

    /// Check `password` against a hash produced by [`PasswordHasher::hash`].
    ///
    /// Returns `Ok(false)` for a wrong password.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Hashing`] when `hash` cannot be parsed.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, HubError>;
}

impl<T: PasswordHasher + Send + Sync> PasswordHasher for std::sync::Arc<T> {
    fn hash(&self, password: &str) -> Result<String, HubError> {
        (**self).hash(password)
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, HubError> {
        (**self).verify(password, hash)
    }
}
