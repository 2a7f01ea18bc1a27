//! Storage ports: repository traits for persistence.
//!
//! Listings take a [`Scope`] so that ownership filtering happens in the
//! store (through the `value → device → room → owner` chain) rather than
//! after the fact. Single-record loads used for authorization return the
//! record together with its owner, read in one go.

use std::future::Future;

use roomhub_domain::device::{Device, DeviceKind, NewDevice};
use roomhub_domain::error::HubError;
use roomhub_domain::id::{DeviceId, RoomId, UserId, ValueId};
use roomhub_domain::policy::{Owned, Scope};
use roomhub_domain::room::{NewRoom, Room};
use roomhub_domain::settings::Settings;
use roomhub_domain::time::Timestamp;
use roomhub_domain::token::Token;
use roomhub_domain::user::{NewUser, User};
use roomhub_domain::value::{NewValue, Value};

/// Repository for [`User`]s.
pub trait UserRepository {
    /// Persist a new user and return it with its assigned id.
    fn create(&self, user: NewUser) -> impl Future<Output = Result<User, HubError>> + Send;

    /// Get a user by id.
    fn get_by_id(&self, id: UserId)
    -> impl Future<Output = Result<Option<User>, HubError>> + Send;

    /// Find a user by exact username.
    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>, HubError>> + Send;
}

/// Repository for [`Room`]s. Deleting a room cascades to its devices and values.
pub trait RoomRepository {
    /// Persist a new room and return it with its assigned id.
    fn create(&self, room: NewRoom) -> impl Future<Output = Result<Room, HubError>> + Send;

    /// Get a room by id, regardless of owner.
    fn get_by_id(&self, id: RoomId)
    -> impl Future<Output = Result<Option<Room>, HubError>> + Send;

    /// List rooms inside `scope`, ordered by id.
    fn list(&self, scope: Scope) -> impl Future<Output = Result<Vec<Room>, HubError>> + Send;

    /// Overwrite an existing room.
    fn update(&self, room: Room) -> impl Future<Output = Result<Room, HubError>> + Send;

    /// Delete a room and everything it contains.
    fn delete(&self, id: RoomId) -> impl Future<Output = Result<(), HubError>> + Send;
}

/// Repository for [`Device`]s of every kind. Deleting a device cascades to its values.
pub trait DeviceRepository {
    /// Persist a new device and return it with its assigned id.
    fn create(&self, device: NewDevice) -> impl Future<Output = Result<Device, HubError>> + Send;

    /// Get a device of `kind` together with the owner of its room.
    fn get_owned(
        &self,
        kind: DeviceKind,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Owned<Device>>, HubError>> + Send;

    /// List devices of `kind` inside `scope`, ordered by id.
    fn list(
        &self,
        kind: DeviceKind,
        scope: Scope,
    ) -> impl Future<Output = Result<Vec<Device>, HubError>> + Send;

    /// List devices of `kind` located in `room_id`, ordered by id.
    fn list_by_room(
        &self,
        kind: DeviceKind,
        room_id: RoomId,
    ) -> impl Future<Output = Result<Vec<Device>, HubError>> + Send;

    /// Overwrite an existing device.
    fn update(&self, device: Device) -> impl Future<Output = Result<Device, HubError>> + Send;

    /// Delete a device and its values.
    fn delete(
        &self,
        kind: DeviceKind,
        id: DeviceId,
    ) -> impl Future<Output = Result<(), HubError>> + Send;
}

/// Repository for [`Value`]s of every kind.
pub trait ValueRepository {
    /// Persist a new reading and return it with its assigned id.
    fn create(&self, value: NewValue) -> impl Future<Output = Result<Value, HubError>> + Send;

    /// Get a value of `kind` together with the owner of its device's room.
    fn get_owned(
        &self,
        kind: DeviceKind,
        id: ValueId,
    ) -> impl Future<Output = Result<Option<Owned<Value>>, HubError>> + Send;

    /// List values of `kind` inside `scope`, ordered by id.
    fn list(
        &self,
        kind: DeviceKind,
        scope: Scope,
    ) -> impl Future<Output = Result<Vec<Value>, HubError>> + Send;

    /// The value with the highest id recorded for `device_id`, if any.
    fn latest_for_device(
        &self,
        kind: DeviceKind,
        device_id: DeviceId,
    ) -> impl Future<Output = Result<Option<Value>, HubError>> + Send;

    /// Overwrite an existing value.
    fn update(&self, value: Value) -> impl Future<Output = Result<Value, HubError>> + Send;

    /// Delete a value.
    fn delete(
        &self,
        kind: DeviceKind,
        id: ValueId,
    ) -> impl Future<Output = Result<(), HubError>> + Send;
}

/// Repository for issued [`Token`]s.
pub trait TokenRepository {
    /// Persist a freshly issued token.
    fn store(&self, token: Token) -> impl Future<Output = Result<Token, HubError>> + Send;

    /// Find a token by its secret.
    fn find(&self, secret: &str) -> impl Future<Output = Result<Option<Token>, HubError>> + Send;

    /// Mark a token as revoked.
    fn revoke(&self, secret: &str) -> impl Future<Output = Result<(), HubError>> + Send;

    /// Delete tokens revoked or expired before `at`, returning how many went.
    fn purge_expired(&self, at: Timestamp) -> impl Future<Output = Result<u64, HubError>> + Send;
}

/// Repository for the singleton [`Settings`] record.
pub trait SettingsRepository {
    /// Read the settings, if they were ever written.
    fn get(&self) -> impl Future<Output = Result<Option<Settings>, HubError>> + Send;

    /// Create or replace the settings.
    fn put(&self, settings: Settings) -> impl Future<Output = Result<Settings, HubError>> + Send;
}
