//! Room: the ownership boundary that contains devices.

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, check_text};
use crate::id::{RoomId, UserId};

/// Maximum room name length.
pub const NAME_MAX_LEN: usize = 100;

/// A room owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    #[serde(rename = "owner")]
    pub owner_id: UserId,
}

impl Room {
    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when `name` is empty or too long.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)
    }

    /// Apply the given changes, keeping current values for absent fields.
    #[must_use]
    pub fn apply(mut self, changes: RoomChanges) -> Self {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(owner_id) = changes.owner_id {
            self.owner_id = owner_id;
        }
        self
    }
}

/// Data needed to persist a new [`Room`]; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewRoom {
    pub name: String,
    pub owner_id: UserId,
}

impl NewRoom {
    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when `name` is empty or too long.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)
    }
}

/// Requested modifications of a [`Room`].
#[derive(Debug, Clone, Default)]
pub struct RoomChanges {
    pub name: Option<String>,
    pub owner_id: Option<UserId>,
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    check_text("name", name, NAME_MAX_LEN)
}
