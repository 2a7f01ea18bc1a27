//! Room service: room CRUD and the aggregated room view.

use roomhub_domain::device::DeviceKind;
use roomhub_domain::error::{HubError, NotFoundError, ValidationError};
use roomhub_domain::id::{RoomId, UserId};
use roomhub_domain::policy::{Action, Scope, Subject, authorize};
use roomhub_domain::room::{NewRoom, Room, RoomChanges};
use roomhub_domain::room_view::RoomView;
use roomhub_domain::user::Identity;

use crate::ports::{DeviceRepository, RoomRepository, UserRepository, ValueRepository};

/// Application service for rooms.
pub struct RoomService<R, D, V, U> {
    rooms: R,
    devices: D,
    values: V,
    users: U,
}

impl<R, D, V, U> RoomService<R, D, V, U>
where
    R: RoomRepository,
    D: DeviceRepository,
    V: ValueRepository,
    U: UserRepository,
{
    /// Create a new service backed by the given repositories.
    pub fn new(rooms: R, devices: D, values: V, users: U) -> Self {
        Self {
            rooms,
            devices,
            values,
            users,
        }
    }

    /// List the rooms visible to `identity`, each as a [`RoomView`].
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repositories.
    pub async fn list(&self, identity: &Identity) -> Result<Vec<RoomView>, HubError> {
        let rooms = self.rooms.list(Scope::for_identity(identity)).await?;
        let mut views = Vec::with_capacity(rooms.len());
        for room in rooms {
            views.push(self.build_view(room).await?);
        }
        Ok(views)
    }

    /// Retrieve one room as a [`RoomView`].
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] when the room does not exist or is
    /// outside the caller's scope, or a storage error.
    pub async fn get(&self, identity: &Identity, id: RoomId) -> Result<RoomView, HubError> {
        let scope = Scope::for_identity(identity);
        let room = self
            .rooms
            .get_by_id(id)
            .await?
            .filter(|room| scope.contains(room.owner_id))
            .ok_or_else(|| not_found(id))?;
        self.build_view(room).await
    }

    /// Create a room. The owner defaults to the caller; assigning it to
    /// someone else is reserved to staff.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] for an invalid name or unknown owner,
    /// [`HubError::Forbidden`] when a non-staff caller names another owner,
    /// or a storage error.
    #[tracing::instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    pub async fn create(
        &self,
        identity: &Identity,
        name: String,
        owner_id: Option<UserId>,
    ) -> Result<Room, HubError> {
        let owner_id = owner_id.unwrap_or(identity.user_id);
        let room = NewRoom { name, owner_id };
        room.validate()?;
        if owner_id != identity.user_id {
            authorize(identity, Subject::Room, Action::Reassign, Some(identity.user_id))?;
            self.ensure_user_exists(owner_id).await?;
        }
        let room = self.rooms.create(room).await?;
        tracing::info!(room_id = %room.id, "room created");
        Ok(room)
    }

    /// Rename a room or hand it over to another user.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] when the room does not exist,
    /// [`HubError::Forbidden`] when the caller is neither staff nor owner, or
    /// changes the owner without being staff, [`HubError::Validation`] for
    /// invalid changes, or a storage error.
    #[tracing::instrument(skip(self, identity, changes), fields(user_id = %identity.user_id))]
    pub async fn update(
        &self,
        identity: &Identity,
        id: RoomId,
        changes: RoomChanges,
    ) -> Result<Room, HubError> {
        let room = self.rooms.get_by_id(id).await?.ok_or_else(|| not_found(id))?;
        authorize(identity, Subject::Room, Action::Update, Some(room.owner_id))?;
        if let Some(owner_id) = changes.owner_id
            && owner_id != room.owner_id
        {
            authorize(identity, Subject::Room, Action::Reassign, Some(room.owner_id))?;
            self.ensure_user_exists(owner_id).await?;
        }
        let room = room.apply(changes);
        room.validate()?;
        self.rooms.update(room).await
    }

    /// Delete a room together with its devices and their values.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] when the room does not exist,
    /// [`HubError::Forbidden`] when the caller is neither staff nor owner, or
    /// a storage error.
    #[tracing::instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    pub async fn delete(&self, identity: &Identity, id: RoomId) -> Result<(), HubError> {
        let room = self.rooms.get_by_id(id).await?.ok_or_else(|| not_found(id))?;
        authorize(identity, Subject::Room, Action::Delete, Some(room.owner_id))?;
        self.rooms.delete(id).await?;
        tracing::info!("room deleted");
        Ok(())
    }

    /// Join the room with its owner's username and every device's latest
    /// reading.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repositories.
    pub async fn build_view(&self, room: Room) -> Result<RoomView, HubError> {
        let owner = self
            .users
            .get_by_id(room.owner_id)
            .await?
            .map(|user| user.username)
            .unwrap_or_default();
        let mut devices = Vec::new();
        for kind in DeviceKind::ALL {
            for device in self.devices.list_by_room(kind, room.id).await? {
                let latest = self
                    .values
                    .latest_for_device(kind, device.id)
                    .await?
                    .map(|value| value.reading);
                devices.push((device, latest));
            }
        }
        Ok(RoomView::assemble(room, owner, devices))
    }

    async fn ensure_user_exists(&self, id: UserId) -> Result<(), HubError> {
        if self.users.get_by_id(id).await?.is_none() {
            return Err(ValidationError::UnknownReference {
                entity: "User",
                id: id.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

fn not_found(id: RoomId) -> HubError {
    NotFoundError {
        entity: "Room",
        id: id.to_string(),
    }
    .into()
}
