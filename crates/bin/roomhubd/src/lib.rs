//! # roomhubd: roomhub daemon
//!
//! Composition root that wires all adapters together.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository implementations (adapters)
//! - Construct application services, injecting repositories via port traits
//! - Bootstrap the superuser and seed the settings
//! - Build the axum router, injecting application services
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

pub mod config;

use std::sync::Arc;

use roomhub_adapter_auth_argon2::Argon2PasswordHasher;
use roomhub_adapter_http_axum::state::{AppState, Backend};
use roomhub_adapter_storage_sqlite_sqlx::{
    Config as DatabaseConfig, SqliteDeviceRepository, SqliteRoomRepository,
    SqliteSettingsRepository, SqliteTokenRepository, SqliteUserRepository, SqliteValueRepository,
};
use roomhub_app::services::{
    AuthService, DeviceService, RoomService, SettingsService, ValueService,
};
use roomhub_domain::settings::Settings;

use crate::config::Config;

/// Error type for start-up failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Adapters backed by `SQLite` and argon2.
pub struct SqliteBackend;

impl Backend for SqliteBackend {
    type Users = SqliteUserRepository;
    type Tokens = SqliteTokenRepository;
    type Hasher = Argon2PasswordHasher;
    type Rooms = SqliteRoomRepository;
    type Devices = SqliteDeviceRepository;
    type Values = SqliteValueRepository;
    type Settings = SqliteSettingsRepository;
}

/// Open the database, wire every service and run the start-up bootstrap.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the database cannot be
/// opened or migrated, or the bootstrap fails.
pub async fn build_state(config: &Config) -> Result<AppState<SqliteBackend>, BoxError> {
    // Database
    let db = DatabaseConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Services
    let auth_service = Arc::new(
        AuthService::new(
            SqliteUserRepository::new(pool.clone()),
            SqliteTokenRepository::new(pool.clone()),
            Argon2PasswordHasher::new(),
        )
        .with_lifetimes(config.token_lifetimes()?),
    );
    let room_service = Arc::new(RoomService::new(
        SqliteRoomRepository::new(pool.clone()),
        SqliteDeviceRepository::new(pool.clone()),
        SqliteValueRepository::new(pool.clone()),
        SqliteUserRepository::new(pool.clone()),
    ));
    let device_service = Arc::new(DeviceService::new(
        SqliteDeviceRepository::new(pool.clone()),
        SqliteRoomRepository::new(pool.clone()),
    ));
    let value_service = Arc::new(ValueService::new(
        SqliteValueRepository::new(pool.clone()),
        SqliteDeviceRepository::new(pool.clone()),
    ));
    let settings_service = Arc::new(SettingsService::new(SqliteSettingsRepository::new(pool)));

    // Bootstrap
    if let Some((username, password)) = config.admin_credentials() {
        let admin = auth_service.ensure_admin(username, password).await?;
        tracing::info!(user_id = %admin.id, username = %admin.username, "admin account ready");
    }
    if let Some(broker_ip) = config.broker_ip()? {
        settings_service.seed(Settings { broker_ip }).await?;
    }

    Ok(AppState::from_arcs(
        auth_service,
        room_service,
        device_service,
        value_service,
        settings_service,
    ))
}
