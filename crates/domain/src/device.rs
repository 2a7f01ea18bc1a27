//! Device: a monitorable/controllable unit located in a room.
//!
//! The three device families (analog, digital, smart) share one structure
//! and differ only through their [`DeviceKind`] tag: smart devices carry a
//! `protocol_name`, and each kind records readings of a different type.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, check_text};
use crate::id::{DeviceId, RoomId};

/// Maximum MAC address length (`AA:BB:CC:DD:EE:FF`).
pub const MAC_ADDRESS_MAX_LEN: usize = 17;
/// Maximum device name length.
pub const NAME_MAX_LEN: usize = 100;
/// Maximum protocol name length for smart devices.
pub const PROTOCOL_NAME_MAX_LEN: usize = 100;

/// The family a device belongs to.
///
/// Variant order is the order devices appear in a room view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    Analog,
    Digital,
    Smart,
}

impl DeviceKind {
    /// Every kind, in room-view order.
    pub const ALL: [Self; 3] = [Self::Analog, Self::Digital, Self::Smart];

    /// Lowercase tag used for storage and routing.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Analog => "analog",
            Self::Digital => "digital",
            Self::Smart => "smart",
        }
    }

    /// Name used when reporting a missing device of this kind.
    #[must_use]
    pub const fn device_entity(self) -> &'static str {
        match self {
            Self::Analog => "AnalogDevice",
            Self::Digital => "DigitalDevice",
            Self::Smart => "SmartDevice",
        }
    }

    /// Name used when reporting a missing value of this kind.
    #[must_use]
    pub const fn value_entity(self) -> &'static str {
        match self {
            Self::Analog => "AnalogValue",
            Self::Digital => "DigitalValue",
            Self::Smart => "SmartValue",
        }
    }

    /// Whether values of this kind accept updates that carry only some fields.
    #[must_use]
    pub const fn allows_partial_value_update(self) -> bool {
        !matches!(self, Self::Digital)
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Analog => f.write_str("Analog"),
            Self::Digital => f.write_str("Digital"),
            Self::Smart => f.write_str("Smart"),
        }
    }
}

/// Error returned when parsing an unknown [`DeviceKind`] tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown device kind: {0}")]
pub struct UnknownDeviceKind(pub String);

impl FromStr for DeviceKind {
    type Err = UnknownDeviceKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "analog" => Ok(Self::Analog),
            "digital" => Ok(Self::Digital),
            "smart" => Ok(Self::Smart),
            other => Err(UnknownDeviceKind(other.to_string())),
        }
    }
}

/// A device of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub kind: DeviceKind,
    pub mac_address: String,
    pub name: String,
    pub ip: IpAddr,
    #[serde(rename = "room")]
    pub room_id: RoomId,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_name: Option<String>,
}

impl Device {
    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when a text field is empty or too long,
    /// or a smart device lacks its protocol name.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(
            self.kind,
            &self.mac_address,
            &self.name,
            self.protocol_name.as_deref(),
        )
    }

    /// Set `active` to `requested` when given, otherwise flip it.
    ///
    /// Returns the new state.
    pub fn activate(&mut self, requested: Option<bool>) -> bool {
        self.active = requested.unwrap_or(!self.active);
        self.active
    }
}

/// Data needed to persist a new [`Device`]; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewDevice {
    pub kind: DeviceKind,
    pub mac_address: String,
    pub name: String,
    pub ip: IpAddr,
    pub room_id: RoomId,
    pub protocol_name: Option<String>,
}

impl NewDevice {
    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when a text field is empty or too long,
    /// or a smart device lacks its protocol name.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(
            self.kind,
            &self.mac_address,
            &self.name,
            self.protocol_name.as_deref(),
        )
    }

    /// Materialize the stored device once the store assigned an id.
    #[must_use]
    pub fn into_device(self, id: DeviceId) -> Device {
        Device {
            id,
            kind: self.kind,
            mac_address: self.mac_address,
            name: self.name,
            ip: self.ip,
            room_id: self.room_id,
            active: false,
            protocol_name: self.protocol_name.filter(|_| self.kind == DeviceKind::Smart),
        }
    }
}

/// Requested modifications of a [`Device`].
///
/// `active` is deliberately absent: it only changes through
/// [`Device::activate`].
#[derive(Debug, Clone, Default)]
pub struct DeviceChanges {
    pub mac_address: Option<String>,
    pub name: Option<String>,
    pub ip: Option<IpAddr>,
    pub room_id: Option<RoomId>,
    pub protocol_name: Option<String>,
}

impl DeviceChanges {
    /// Whether the changes move the device to a different room.
    #[must_use]
    pub fn moves_from(&self, room_id: RoomId) -> bool {
        self.room_id.is_some_and(|target| target != room_id)
    }

    /// Apply the changes to `device`.
    ///
    /// The room is only changed when `allow_room_change` is set; every other
    /// field falls back to its current value when absent.
    #[must_use]
    pub fn apply(self, mut device: Device, allow_room_change: bool) -> Device {
        if allow_room_change && let Some(room_id) = self.room_id {
            device.room_id = room_id;
        }
        if let Some(mac_address) = self.mac_address {
            device.mac_address = mac_address;
        }
        if let Some(name) = self.name {
            device.name = name;
        }
        if let Some(ip) = self.ip {
            device.ip = ip;
        }
        if device.kind == DeviceKind::Smart && let Some(protocol_name) = self.protocol_name {
            device.protocol_name = Some(protocol_name);
        }
        device
    }
}

/// Parse an IPv4 or IPv6 address.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidIp`] when `value` is not an address.
pub fn parse_ip(value: &str) -> Result<IpAddr, ValidationError> {
    IpAddr::from_str(value.trim()).map_err(|_| ValidationError::InvalidIp(value.to_string()))
}

fn validate_fields(
    kind: DeviceKind,
    mac_address: &str,
    name: &str,
    protocol_name: Option<&str>,
) -> Result<(), ValidationError> {
    check_text("mac_address", mac_address, MAC_ADDRESS_MAX_LEN)?;
    check_text("name", name, NAME_MAX_LEN)?;
    if kind == DeviceKind::Smart {
        let protocol_name = protocol_name.ok_or(ValidationError::MissingField {
            field: "protocol_name",
        })?;
        check_text("protocol_name", protocol_name, PROTOCOL_NAME_MAX_LEN)?;
    }
    Ok(())
}
