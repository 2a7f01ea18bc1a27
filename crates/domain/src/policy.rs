//! Ownership policy: who may do what to rooms, devices, values and settings.
//!
//! Every decision is looked up in a single table keyed by
//! `(Subject, Action)` and evaluated against the owner resolved from the
//! target's ownership chain (`value → device → room → owner`). Callers load
//! that chain in one read and hand the owner in, so the decision and the
//! data it was made on come from the same snapshot.
//!
//! A superuser passes every rule.

use serde::Serialize;

use crate::error::ForbiddenError;
use crate::id::UserId;
use crate::user::Identity;

/// The kind of resource an action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Subject {
    Room,
    Device,
    Value,
    Settings,
}

/// What the caller attempts to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
    /// List or retrieve. Failing it hides the row instead of raising.
    View,
    Create,
    Update,
    Delete,
    /// Toggle a device's `active` flag.
    Activate,
    /// Move a device to another room, or give a room to another user.
    Reassign,
}

/// Predicate applied to `(identity, owner)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Authenticated,
    StaffOrOwner,
    /// Literal ownership; staff alone is not enough.
    OwnerOnly,
    StaffOnly,
}

impl Rule {
    fn permits(self, identity: &Identity, owner: Option<UserId>) -> bool {
        if identity.is_superuser {
            return true;
        }
        let is_owner = owner == Some(identity.user_id);
        match self {
            Self::Authenticated => true,
            Self::StaffOrOwner => identity.is_staff || is_owner,
            Self::OwnerOnly => is_owner,
            Self::StaffOnly => identity.is_staff,
        }
    }
}

const ROOM_WRITE: &str = "You are not the owner or an admin of this room.";
const ROOM_REASSIGN: &str = "Only an admin can assign a room to another user.";
const DEVICE_CREATE: &str =
    "You cannot create a device in a room you don't own or you are not an admin.";
const DEVICE_ACCESS: &str = "You cannot access this device, because it is not in your room";
const DEVICE_REASSIGN: &str = "You are not allowed to change the room of the device.";
const DEVICE_DELETE: &str = "You are not authorized to delete this device.";
const VALUE_CREATE: &str =
    "You cannot create a value for a device in a room you don't own or you are not an admin.";
const VALUE_UPDATE: &str = "You are not allowed to change the value of the device.";
const VALUE_DELETE: &str = "You are not authorized to delete this value.";
const SETTINGS_UPDATE: &str = "Only an admin can change the settings.";
const NOT_ALLOWED: &str = "You do not have permission to perform this action.";

/// The policy table: rule and denial reason for each `(subject, action)`.
#[must_use]
pub const fn rule_for(subject: Subject, action: Action) -> (Rule, &'static str) {
    match (subject, action) {
        (Subject::Room, Action::View) => (Rule::StaffOrOwner, NOT_ALLOWED),
        (Subject::Room, Action::Create) => (Rule::Authenticated, NOT_ALLOWED),
        (Subject::Room, Action::Update | Action::Delete) => (Rule::StaffOrOwner, ROOM_WRITE),
        (Subject::Room, Action::Reassign) => (Rule::StaffOnly, ROOM_REASSIGN),
        (Subject::Room, Action::Activate) => (Rule::StaffOnly, NOT_ALLOWED),

        (Subject::Device, Action::View) => (Rule::StaffOrOwner, NOT_ALLOWED),
        (Subject::Device, Action::Create) => (Rule::StaffOrOwner, DEVICE_CREATE),
        (Subject::Device, Action::Update | Action::Activate) => {
            (Rule::StaffOrOwner, DEVICE_ACCESS)
        }
        (Subject::Device, Action::Reassign) => (Rule::StaffOnly, DEVICE_REASSIGN),
        (Subject::Device, Action::Delete) => (Rule::StaffOrOwner, DEVICE_DELETE),

        (Subject::Value, Action::View) => (Rule::StaffOrOwner, NOT_ALLOWED),
        (Subject::Value, Action::Create) => (Rule::StaffOrOwner, VALUE_CREATE),
        (Subject::Value, Action::Update) => (Rule::OwnerOnly, VALUE_UPDATE),
        (Subject::Value, Action::Delete) => (Rule::StaffOrOwner, VALUE_DELETE),
        (Subject::Value, Action::Activate | Action::Reassign) => (Rule::StaffOnly, NOT_ALLOWED),

        (Subject::Settings, Action::View) => (Rule::Authenticated, NOT_ALLOWED),
        (Subject::Settings, _) => (Rule::StaffOnly, SETTINGS_UPDATE),
    }
}

/// Whether `identity` may perform `action` on a `subject` owned by `owner`.
#[must_use]
pub fn permits(
    identity: &Identity,
    subject: Subject,
    action: Action,
    owner: Option<UserId>,
) -> bool {
    let (rule, _) = rule_for(subject, action);
    rule.permits(identity, owner)
}

/// Like [`permits`], but reports the denial reason.
///
/// # Errors
///
/// Returns [`ForbiddenError`] carrying the table's reason when denied.
pub fn authorize(
    identity: &Identity,
    subject: Subject,
    action: Action,
    owner: Option<UserId>,
) -> Result<(), ForbiddenError> {
    let (rule, reason) = rule_for(subject, action);
    if rule.permits(identity, owner) {
        Ok(())
    } else {
        Err(ForbiddenError { reason })
    }
}

/// Which rows a listing may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every row of the collection.
    All,
    /// Only rows whose ownership chain ends at this user.
    OwnedBy(UserId),
}

impl Scope {
    /// Listing scope for `identity`: staff (and superusers) see everything.
    #[must_use]
    pub fn for_identity(identity: &Identity) -> Self {
        if identity.is_staff || identity.is_superuser {
            Self::All
        } else {
            Self::OwnedBy(identity.user_id)
        }
    }

    /// Whether a row owned by `owner` falls inside the scope.
    #[must_use]
    pub fn contains(self, owner: UserId) -> bool {
        match self {
            Self::All => true,
            Self::OwnedBy(user_id) => user_id == owner,
        }
    }
}

/// A record together with the owner at the end of its ownership chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Owned<T> {
    pub item: T,
    pub owner_id: UserId,
}
