//! Shared application state for axum handlers.

use std::sync::Arc;

use roomhub_app::ports::{
    DeviceRepository, PasswordHasher, RoomRepository, SettingsRepository, TokenRepository,
    UserRepository, ValueRepository,
};
use roomhub_app::services::{
    AuthService, DeviceService, RoomService, SettingsService, ValueService,
};

/// The concrete adapter types behind every port.
pub trait Backend: 'static {
    type Users: UserRepository + Send + Sync + 'static;
    type Tokens: TokenRepository + Send + Sync + 'static;
    type Hasher: PasswordHasher + Send + Sync + 'static;
    type Rooms: RoomRepository + Send + Sync + 'static;
    type Devices: DeviceRepository + Send + Sync + 'static;
    type Values: ValueRepository + Send + Sync + 'static;
    type Settings: SettingsRepository + Send + Sync + 'static;
}

pub type Auth<B> =
    AuthService<<B as Backend>::Users, <B as Backend>::Tokens, <B as Backend>::Hasher>;
pub type Rooms<B> = RoomService<
    <B as Backend>::Rooms,
    <B as Backend>::Devices,
    <B as Backend>::Values,
    <B as Backend>::Users,
>;
pub type Devices<B> = DeviceService<<B as Backend>::Devices, <B as Backend>::Rooms>;
pub type Values<B> = ValueService<<B as Backend>::Values, <B as Backend>::Devices>;
pub type Settings<B> = SettingsService<<B as Backend>::Settings>;

/// Application state shared across all axum handlers.
///
/// `Clone` is implemented manually so the underlying types themselves do not
/// need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<B: Backend> {
    /// Accounts and tokens.
    pub auth_service: Arc<Auth<B>>,
    /// Room CRUD and aggregated views.
    pub room_service: Arc<Rooms<B>>,
    /// Device CRUD and activation, for every kind.
    pub device_service: Arc<Devices<B>>,
    /// Reading history, for every kind.
    pub value_service: Arc<Values<B>>,
    /// Installation settings.
    pub settings_service: Arc<Settings<B>>,
}

impl<B: Backend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            auth_service: Arc::clone(&self.auth_service),
            room_service: Arc::clone(&self.room_service),
            device_service: Arc::clone(&self.device_service),
            value_service: Arc::clone(&self.value_service),
            settings_service: Arc::clone(&self.settings_service),
        }
    }
}

impl<B: Backend> AppState<B> {
    /// Create a new application state from service instances.
    pub fn new(
        auth_service: Auth<B>,
        room_service: Rooms<B>,
        device_service: Devices<B>,
        value_service: Values<B>,
        settings_service: Settings<B>,
    ) -> Self {
        Self::from_arcs(
            Arc::new(auth_service),
            Arc::new(room_service),
            Arc::new(device_service),
            Arc::new(value_service),
            Arc::new(settings_service),
        )
    }

    /// Create a new application state from pre-wrapped `Arc` services.
    ///
    /// Use this when services are also needed outside the HTTP layer, such as
    /// the admin bootstrap at start-up.
    pub fn from_arcs(
        auth_service: Arc<Auth<B>>,
        room_service: Arc<Rooms<B>>,
        device_service: Arc<Devices<B>>,
        value_service: Arc<Values<B>>,
        settings_service: Arc<Settings<B>>,
    ) -> Self {
        Self {
            auth_service,
            room_service,
            device_service,
            value_service,
            settings_service,
        }
    }
}
