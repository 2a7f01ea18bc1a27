//! Room view: a derived, never-persisted read model of a room and the
//! latest reading of every device it contains.

use std::net::IpAddr;

use serde::Serialize;

use crate::device::{Device, DeviceKind};
use crate::id::{DeviceId, RoomId};
use crate::room::Room;
use crate::value::Reading;

/// A room as returned by list/retrieve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomView {
    pub id: RoomId,
    pub name: String,
    /// Username of the owner.
    pub owner: String,
    pub devices: Vec<DeviceSummary>,
}

/// One device line of a [`RoomView`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSummary {
    pub id: DeviceId,
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    pub name: String,
    pub ip: IpAddr,
    /// Most recent reading, `null` when the device never reported.
    pub value: Option<Reading>,
}

impl RoomView {
    /// Assemble the view from a room, its owner's username and every device
    /// paired with its latest reading.
    ///
    /// Devices are ordered analog, digital, smart, then by id.
    #[must_use]
    pub fn assemble(
        room: Room,
        owner: impl Into<String>,
        devices: impl IntoIterator<Item = (Device, Option<Reading>)>,
    ) -> Self {
        let mut devices: Vec<DeviceSummary> = devices
            .into_iter()
            .map(|(device, value)| DeviceSummary {
                id: device.id,
                kind: device.kind,
                name: device.name,
                ip: device.ip,
                value,
            })
            .collect();
        devices.sort_by_key(|summary| (summary.kind, summary.id));

        Self {
            id: room.id,
            name: room.name,
            owner: owner.into(),
            devices,
        }
    }
}
