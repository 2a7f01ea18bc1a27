//! Value service: use-cases for the reading history of devices.

use roomhub_domain::device::{Device, DeviceKind};
use roomhub_domain::error::{HubError, NotFoundError, ValidationError};
use roomhub_domain::id::{DeviceId, ValueId};
use roomhub_domain::policy::{Action, Owned, Scope, Subject, authorize};
use roomhub_domain::user::Identity;
use roomhub_domain::value::{NewValue, Reading, Value, ValueChanges};

use crate::ports::{DeviceRepository, ValueRepository};

/// Application service for device readings, parameterized per call by
/// [`DeviceKind`].
pub struct ValueService<V, D> {
    values: V,
    devices: D,
}

impl<V, D> ValueService<V, D>
where
    V: ValueRepository,
    D: DeviceRepository,
{
    /// Create a new service backed by the given repositories.
    pub fn new(values: V, devices: D) -> Self {
        Self { values, devices }
    }

    /// List the values of `kind` visible to `identity`.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list(
        &self,
        identity: &Identity,
        kind: DeviceKind,
    ) -> Result<Vec<Value>, HubError> {
        self.values.list(kind, Scope::for_identity(identity)).await
    }

    /// Retrieve one value.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] when the value does not exist or is
    /// outside the caller's scope, or a storage error.
    pub async fn get(
        &self,
        identity: &Identity,
        kind: DeviceKind,
        id: ValueId,
    ) -> Result<Value, HubError> {
        let scope = Scope::for_identity(identity);
        self.values
            .get_owned(kind, id)
            .await?
            .filter(|owned| scope.contains(owned.owner_id))
            .map(|owned| owned.item)
            .ok_or_else(|| not_found(kind, id))
    }

    /// Record a new reading for a device.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] when the reading does not fit `kind`
    /// or the device is unknown, [`HubError::Forbidden`] when the caller is
    /// neither staff nor owner of the device's room, or a storage error.
    #[tracing::instrument(skip(self, identity, reading), fields(user_id = %identity.user_id))]
    pub async fn create(
        &self,
        identity: &Identity,
        kind: DeviceKind,
        device_id: DeviceId,
        reading: Reading,
    ) -> Result<Value, HubError> {
        let reading = reading.conform(kind)?;
        let device = self.device(kind, device_id).await?;
        authorize(identity, Subject::Value, Action::Create, Some(device.owner_id))?;
        let value = self
            .values
            .create(NewValue {
                kind,
                device_id,
                reading,
            })
            .await?;
        tracing::debug!(value_id = %value.id, "value recorded");
        Ok(value)
    }

    /// Replace (`partial == false`) or patch (`partial == true`) a value.
    ///
    /// Only the owner of the device's room may change a reading; staff alone
    /// is not enough. Moving the value to another device also requires
    /// owning that device's room. Digital values only support full
    /// replacement.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] for a missing field, an unsupported
    /// partial update, an unknown device or an ill-typed reading,
    /// [`HubError::NotFound`] when the value does not exist,
    /// [`HubError::Forbidden`] when the caller does not own the chain, or a
    /// storage error.
    #[tracing::instrument(skip(self, identity, changes), fields(user_id = %identity.user_id))]
    pub async fn update(
        &self,
        identity: &Identity,
        kind: DeviceKind,
        id: ValueId,
        changes: ValueChanges,
        partial: bool,
    ) -> Result<Value, HubError> {
        if partial && !kind.allows_partial_value_update() {
            return Err(ValidationError::PartialUpdateUnsupported { kind }.into());
        }
        if !partial && let Some(field) = changes.missing_field() {
            return Err(ValidationError::MissingField { field }.into());
        }
        let reading = changes
            .reading
            .map(|reading| reading.conform(kind))
            .transpose()?;

        let Owned { item: mut value, owner_id } = self
            .values
            .get_owned(kind, id)
            .await?
            .ok_or_else(|| not_found(kind, id))?;
        authorize(identity, Subject::Value, Action::Update, Some(owner_id))?;

        if let Some(target) = changes.device_id
            && target != value.device_id
        {
            let device = self.device(kind, target).await?;
            authorize(identity, Subject::Value, Action::Update, Some(device.owner_id))?;
            value.device_id = target;
        }
        if let Some(reading) = reading {
            value.reading = reading;
        }
        self.values.update(value).await
    }

    /// Delete a value.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] when the value does not exist,
    /// [`HubError::Forbidden`] when the caller is neither staff nor owner, or
    /// a storage error.
    #[tracing::instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    pub async fn delete(
        &self,
        identity: &Identity,
        kind: DeviceKind,
        id: ValueId,
    ) -> Result<(), HubError> {
        let owned = self
            .values
            .get_owned(kind, id)
            .await?
            .ok_or_else(|| not_found(kind, id))?;
        authorize(identity, Subject::Value, Action::Delete, Some(owned.owner_id))?;
        self.values.delete(kind, id).await
    }

    async fn device(&self, kind: DeviceKind, id: DeviceId) -> Result<Owned<Device>, HubError> {
        self.devices.get_owned(kind, id).await?.ok_or_else(|| {
            ValidationError::UnknownReference {
                entity: kind.device_entity(),
                id: id.to_string(),
            }
            .into()
        })
    }
}

fn not_found(kind: DeviceKind, id: ValueId) -> HubError {
    NotFoundError {
        entity: kind.value_entity(),
        id: id.to_string(),
    }
    .into()
}
