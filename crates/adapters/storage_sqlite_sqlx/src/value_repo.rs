//! `SQLite` implementation of [`ValueRepository`].
//!
//! Readings of every kind live in `device_values`; the column holding the
//! reading depends on `kind` (`value_real`, `value_bool` or `value_text`).

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use roomhub_app::ports::ValueRepository;
use roomhub_domain::device::DeviceKind;
use roomhub_domain::error::HubError;
use roomhub_domain::id::{DeviceId, UserId, ValueId};
use roomhub_domain::policy::{Owned, Scope};
use roomhub_domain::value::{NewValue, Reading, Value};

use crate::error::{StorageError, decode};
use crate::owner_filter;

/// Wrapper for converting database rows into domain [`Value`].
struct Wrapper(Value);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Value> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let kind: String = row.try_get("kind")?;
        let kind = DeviceKind::from_str(&kind).map_err(decode)?;
        let reading = match kind {
            DeviceKind::Analog => row
                .try_get::<Option<f64>, _>("value_real")?
                .map(Reading::Float),
            DeviceKind::Digital => row
                .try_get::<Option<bool>, _>("value_bool")?
                .map(Reading::Bool),
            DeviceKind::Smart => row
                .try_get::<Option<String>, _>("value_text")?
                .map(Reading::Text),
        }
        .ok_or_else(|| decode(format!("{kind} value without reading")))?;

        Ok(Self(Value {
            id: ValueId::new(row.try_get("id")?),
            kind,
            device_id: DeviceId::new(row.try_get("device_id")?),
            reading,
        }))
    }
}

/// A value row joined with the owner of its device's room.
struct OwnedWrapper(Owned<Value>);

impl<'r> FromRow<'r, SqliteRow> for OwnedWrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let Wrapper(item) = Wrapper::from_row(row)?;
        Ok(Self(Owned {
            item,
            owner_id: UserId::new(row.try_get("owner_id")?),
        }))
    }
}

/// The three reading columns, only one of which is set.
fn columns(reading: &Reading) -> (Option<f64>, Option<bool>, Option<&str>) {
    match reading {
        Reading::Float(value) => (Some(*value), None, None),
        Reading::Bool(value) => (None, Some(*value), None),
        Reading::Text(value) => (None, None, Some(value.as_str())),
    }
}

const INSERT: &str = "INSERT INTO device_values \
    (kind, device_id, value_real, value_bool, value_text) \
    VALUES (?, ?, ?, ?, ?)";
const SELECT_OWNED: &str = "\
SELECT v.*, r.owner_id FROM device_values v
JOIN devices d ON d.id = v.device_id
JOIN rooms r ON r.id = d.room_id
WHERE v.kind = ? AND v.id = ?";
const SELECT_SCOPED: &str = "\
SELECT v.* FROM device_values v
JOIN devices d ON d.id = v.device_id
JOIN rooms r ON r.id = d.room_id
WHERE v.kind = ?1 AND (?2 IS NULL OR r.owner_id = ?2)
ORDER BY v.id";
const SELECT_LATEST: &str =
    "SELECT * FROM device_values WHERE kind = ? AND device_id = ? ORDER BY id DESC LIMIT 1";
const UPDATE: &str = "UPDATE device_values \
    SET device_id = ?, value_real = ?, value_bool = ?, value_text = ? \
    WHERE id = ? AND kind = ?";
const DELETE_BY_ID: &str = "DELETE FROM device_values WHERE kind = ? AND id = ?";

/// `SQLite`-backed value repository.
pub struct SqliteValueRepository {
    pool: SqlitePool,
}

impl SqliteValueRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ValueRepository for SqliteValueRepository {
    fn create(&self, value: NewValue) -> impl Future<Output = Result<Value, HubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let (real, boolean, text) = columns(&value.reading);
            let result = sqlx::query(INSERT)
                .bind(value.kind.as_str())
                .bind(value.device_id.as_i64())
                .bind(real)
                .bind(boolean)
                .bind(text)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(value.into_value(ValueId::new(result.last_insert_rowid())))
        }
    }

    fn get_owned(
        &self,
        kind: DeviceKind,
        id: ValueId,
    ) -> impl Future<Output = Result<Option<Owned<Value>>, HubError>> + Send {
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
    ) -> impl Future<Output = Result<Vec<Value>, HubError>> + Send {
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

    fn latest_for_device(
        &self,
        kind: DeviceKind,
        device_id: DeviceId,
    ) -> impl Future<Output = Result<Option<Value>, HubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_LATEST)
                .bind(kind.as_str())
                .bind(device_id.as_i64())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn update(&self, value: Value) -> impl Future<Output = Result<Value, HubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let (real, boolean, text) = columns(&value.reading);
            sqlx::query(UPDATE)
                .bind(value.device_id.as_i64())
                .bind(real)
                .bind(boolean)
                .bind(text)
                .bind(value.id.as_i64())
                .bind(value.kind.as_str())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(value)
        }
    }

    fn delete(
        &self,
        kind: DeviceKind,
        id: ValueId,
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
