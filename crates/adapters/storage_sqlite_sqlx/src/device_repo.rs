//! `SQLite` implementation of [`DeviceRepository`].
//!
//! All three device kinds share the `devices` table, told apart by `kind`.

use std::future::Future;
use std::net::IpAddr;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use roomhub_app::ports::DeviceRepository;
use roomhub_domain::device::{Device, DeviceKind, NewDevice};
use roomhub_domain::error::HubError;
use roomhub_domain::id::{DeviceId, RoomId, UserId};
use roomhub_domain::policy::{Owned, Scope};

use crate::error::{StorageError, decode};
use crate::owner_filter;

/// Wrapper for converting database rows into domain [`Device`].
struct Wrapper(Device);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let kind: String = row.try_get("kind")?;
        let ip: String = row.try_get("ip")?;

        Ok(Self(Device {
            id: DeviceId::new(row.try_get("id")?),
            kind: DeviceKind::from_str(&kind).map_err(decode)?,
            mac_address: row.try_get("mac_address")?,
            name: row.try_get("name")?,
            ip: IpAddr::from_str(&ip).map_err(decode)?,
            room_id: RoomId::new(row.try_get("room_id")?),
            active: row.try_get("active")?,
            protocol_name: row.try_get("protocol_name")?,
        }))
    }
}

/// A device row joined with the owner of its room.
struct OwnedWrapper(Owned<Device>);

impl<'r> FromRow<'r, SqliteRow> for OwnedWrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let Wrapper(item) = Wrapper::from_row(row)?;
        Ok(Self(Owned {
            item,
            owner_id: UserId::new(row.try_get("owner_id")?),
        }))
    }
}

const INSERT: &str = "INSERT INTO devices \
    (kind, mac_address, name, ip, room_id, active, protocol_name) \
    VALUES (?, ?, ?, ?, ?, ?, ?)";
const SELECT_OWNED: &str = "\
SELECT d.*, r.owner_id FROM devices d
JOIN rooms r ON r.id = d.room_id
WHERE d.kind = ? AND d.id = ?";
const SELECT_SCOPED: &str = "\
SELECT d.* FROM devices d
JOIN rooms r ON r.id = d.room_id
WHERE d.kind = ?1 AND (?2 IS NULL OR r.owner_id = ?2)
ORDER BY d.id";
const SELECT_BY_ROOM: &str = "SELECT * FROM devices WHERE kind = ? AND room_id = ? ORDER BY id";
const UPDATE: &str = "UPDATE devices \
    SET mac_address = ?, name = ?, ip = ?, room_id = ?, active = ?, protocol_name = ? \
    WHERE id = ? AND kind = ?";
const DELETE_BY_ID: &str = "DELETE FROM devices WHERE kind = ? AND id = ?";

/// `SQLite`-backed device repository.
pub struct SqliteDeviceRepository {
    pool: SqlitePool,
}

impl SqliteDeviceRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl DeviceRepository for SqliteDeviceRepository {
    fn create(&self, device: NewDevice) -> impl Future<Output = Result<Device, HubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let protocol_name = device
                .protocol_name
                .clone()
                .filter(|_| device.kind == DeviceKind::Smart);
            let result = sqlx::query(INSERT)
                .bind(device.kind.as_str())
                .bind(&device.mac_address)
                .bind(&device.name)
                .bind(device.ip.to_string())
                .bind(device.room_id.as_i64())
                .bind(false)
                .bind(protocol_name)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(device.into_device(DeviceId::new(result.last_insert_rowid())))
        }
    }

    fn get_owned(
        &self,
        kind: DeviceKind,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Owned<Device>>, HubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<OwnedWrapper> = sqlx::query_as(SELECT_OWNED)
                .bind(kind.as_str())
                .bind(id.as_i64())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }

    fn list(
        &self,
        kind: DeviceKind,
        scope: Scope,
    ) -> impl Future<Output = Result<Vec<Device>, HubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_SCOPED)
                .bind(kind.as_str())
                .bind(owner_filter(scope))
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn list_by_room(
        &self,
        kind: DeviceKind,
        room_id: RoomId,
    ) -> impl Future<Output = Result<Vec<Device>, HubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_ROOM)
                .bind(kind.as_str())
                .bind(room_id.as_i64())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(&self, device: Device) -> impl Future<Output = Result<Device, HubError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPDATE)
                .bind(&device.mac_address)
                .bind(&device.name)
                .bind(device.ip.to_string())
                .bind(device.room_id.as_i64())
                .bind(device.active)
                .bind(&device.protocol_name)
                .bind(device.id.as_i64())
                .bind(device.kind.as_str())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(device)
        }
    }

    fn delete(
        &self,
        kind: DeviceKind,
        id: DeviceId,
    ) -> impl Future<Output = Result<(), HubError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(DELETE_BY_ID)
                .bind(kind.as_str())
                .bind(id.as_i64())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}
