//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`HubError`]
//! via `#[from]` (domain errors) or explicit `From` impls (adapter errors).

use crate::device::DeviceKind;

/// Top-level error returned by services and ports.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Forbidden(#[from] ForbiddenError),

    #[error(transparent)]
    Authentication(#[from] AuthenticationError),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("password hashing error")]
    Hashing(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Input rejected before any mutation took place.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("invalid ip address: {0}")]
    InvalidIp(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("invalid value for {kind} device: {reason}")]
    InvalidReading {
        kind: DeviceKind,
        reason: &'static str,
    },

    #[error("{entity} {id} does not exist")]
    UnknownReference { entity: &'static str, id: String },

    #[error("username is already taken")]
    UsernameTaken,

    #[error("{kind} values do not support partial updates")]
    PartialUpdateUnsupported { kind: DeviceKind },

    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

/// The requested resource does not exist (or is outside the caller's scope).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// The identity is known but the action is not allowed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct ForbiddenError {
    pub reason: &'static str,
}

/// Credentials or tokens could not be verified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("authentication credentials were not provided")]
    MissingToken,

    #[error("token is invalid or expired")]
    InvalidToken,
}

/// Require `value` to be non-empty and at most `max` characters long.
pub(crate) fn check_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}
