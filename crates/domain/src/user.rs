//! Users and the per-request identity derived from them.

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, check_text};
use crate::id::UserId;

/// Maximum username length.
pub const USERNAME_MAX_LEN: usize = 150;

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Data needed to persist a new [`User`]; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl NewUser {
    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the username is empty or too long.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_text("username", &self.username, USERNAME_MAX_LEN)
    }
}

/// The resolved caller of an operation.
///
/// Passed explicitly to every service call; never read from ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
        }
    }
}
