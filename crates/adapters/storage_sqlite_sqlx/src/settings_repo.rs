//! `SQLite` implementation of [`SettingsRepository`].

use std::future::Future;
use std::net::IpAddr;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use roomhub_app::ports::SettingsRepository;
use roomhub_domain::error::HubError;
use roomhub_domain::settings::Settings;

use crate::error::{StorageError, decode};

/// Wrapper for converting database rows into domain [`Settings`].
struct Wrapper(Settings);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let broker_ip: String = row.try_get("broker_ip")?;
        Ok(Self(Settings {
            broker_ip: IpAddr::from_str(&broker_ip).map_err(decode)?,
        }))
    }
}

const SELECT: &str = "SELECT broker_ip FROM settings WHERE id = 1";
const UPSERT: &str = "INSERT INTO settings (id, broker_ip) \
    VALUES (1, ?) \
    ON CONFLICT (id) \
    DO UPDATE SET broker_ip = excluded.broker_ip";

/// `SQLite`-backed settings repository. The table holds at most one row.
pub struct SqliteSettingsRepository {
    pool: SqlitePool,
}

impl SqliteSettingsRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl SettingsRepository for SqliteSettingsRepository {
    fn get(&self) -> impl Future<Output = Result<Option<Settings>, HubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }

    fn put(&self, settings: Settings) -> impl Future<Output = Result<Settings, HubError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPSERT)
                .bind(settings.broker_ip.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(settings)
        }
    }
}
