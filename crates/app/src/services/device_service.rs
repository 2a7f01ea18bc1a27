//! Device service: use-cases for managing devices of every kind.

use roomhub_domain::device::{Device, DeviceChanges, DeviceKind, NewDevice};
use roomhub_domain::error::{HubError, NotFoundError, ValidationError};
use roomhub_domain::id::{DeviceId, RoomId};
use roomhub_domain::policy::{Action, Owned, Scope, Subject, authorize, permits};
use roomhub_domain::user::Identity;

use crate::ports::{DeviceRepository, RoomRepository};

/// Application service for device CRUD and activation, parameterized per
/// call by [`DeviceKind`].
pub struct DeviceService<D, R> {
    devices: D,
    rooms: R,
}

impl<D, R> DeviceService<D, R>
where
    D: DeviceRepository,
    R: RoomRepository,
{
    /// Create a new service backed by the given repositories.
    pub fn new(devices: D, rooms: R) -> Self {
        Self { devices, rooms }
    }

    /// List the devices of `kind` visible to `identity`.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list(
        &self,
        identity: &Identity,
        kind: DeviceKind,
    ) -> Result<Vec<Device>, HubError> {
        self.devices.list(kind, Scope::for_identity(identity)).await
    }

    /// Retrieve one device.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] when the device does not exist or is
    /// outside the caller's scope, or a storage error.
    pub async fn get(
        &self,
        identity: &Identity,
        kind: DeviceKind,
        id: DeviceId,
    ) -> Result<Device, HubError> {
        let scope = Scope::for_identity(identity);
        self.load(kind, id)
            .await?
            .filter(|owned| scope.contains(owned.owner_id))
            .map(|owned| owned.item)
            .ok_or_else(|| not_found(kind, id))
    }

    /// Register a device in a room the caller owns (or any room, for staff).
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] for invalid fields or an unknown
    /// room, [`HubError::Forbidden`] when the caller may not add devices to
    /// that room, or a storage error.
    #[tracing::instrument(
        skip(self, identity, device),
        fields(user_id = %identity.user_id, kind = %device.kind, device_name = %device.name)
    )]
    pub async fn create(&self, identity: &Identity, device: NewDevice) -> Result<Device, HubError> {
        device.validate()?;
        let room = self
            .rooms
            .get_by_id(device.room_id)
            .await?
            .ok_or_else(|| unknown_room(device.room_id))?;
        authorize(identity, Subject::Device, Action::Create, Some(room.owner_id))?;
        let device = self.devices.create(device).await?;
        tracing::info!(device_id = %device.id, "device created");
        Ok(device)
    }

    /// Update a device's fields.
    ///
    /// Moving the device to another room requires staff; when a non-staff
    /// caller asks for it, the room is left as is and the other changes
    /// still apply.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] when the device does not exist,
    /// [`HubError::Forbidden`] when the caller is neither staff nor owner,
    /// [`HubError::Validation`] for invalid changes, or a storage error.
    #[tracing::instrument(skip(self, identity, changes), fields(user_id = %identity.user_id))]
    pub async fn update(
        &self,
        identity: &Identity,
        kind: DeviceKind,
        id: DeviceId,
        changes: DeviceChanges,
    ) -> Result<Device, HubError> {
        let Owned { item: device, owner_id } =
            self.load(kind, id).await?.ok_or_else(|| not_found(kind, id))?;
        authorize(identity, Subject::Device, Action::Update, Some(owner_id))?;

        let mut allow_room_change = false;
        if changes.moves_from(device.room_id) {
            allow_room_change =
                permits(identity, Subject::Device, Action::Reassign, Some(owner_id));
            if let Some(target) = changes.room_id {
                if allow_room_change {
                    if self.rooms.get_by_id(target).await?.is_none() {
                        return Err(unknown_room(target));
                    }
                } else {
                    tracing::debug!(
                        room_id = %target,
                        "ignoring room change requested by non-staff"
                    );
                }
            }
        }

        let device = changes.apply(device, allow_room_change);
        device.validate()?;
        self.devices.update(device).await
    }

    /// Delete a device and its recorded values.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] when the device does not exist,
    /// [`HubError::Forbidden`] when the caller is neither staff nor owner, or
    /// a storage error.
    #[tracing::instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    pub async fn delete(
        &self,
        identity: &Identity,
        kind: DeviceKind,
        id: DeviceId,
    ) -> Result<(), HubError> {
        let owned = self.load(kind, id).await?.ok_or_else(|| not_found(kind, id))?;
        authorize(identity, Subject::Device, Action::Delete, Some(owned.owner_id))?;
        self.devices.delete(kind, id).await?;
        tracing::info!("device deleted");
        Ok(())
    }

    /// Set the device's `active` flag, or flip it when `requested` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] when the device does not exist,
    /// [`HubError::Forbidden`] when the caller is neither staff nor owner, or
    /// a storage error.
    #[tracing::instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    pub async fn activate(
        &self,
        identity: &Identity,
        kind: DeviceKind,
        id: DeviceId,
        requested: Option<bool>,
    ) -> Result<Device, HubError> {
        let Owned { item: mut device, owner_id } =
            self.load(kind, id).await?.ok_or_else(|| not_found(kind, id))?;
        authorize(identity, Subject::Device, Action::Activate, Some(owner_id))?;
        let active = device.activate(requested);
        tracing::debug!(active, "device activation changed");
        self.devices.update(device).await
    }

    async fn load(
        &self,
        kind: DeviceKind,
        id: DeviceId,
    ) -> Result<Option<Owned<Device>>, HubError> {
        self.devices.get_owned(kind, id).await
    }
}

fn not_found(kind: DeviceKind, id: DeviceId) -> HubError {
    NotFoundError {
        entity: kind.device_entity(),
        id: id.to_string(),
    }
    .into()
}

fn unknown_room(id: RoomId) -> HubError {
    ValidationError::UnknownReference {
        entity: "Room",
        id: id.to_string(),
    }
    .into()
}
