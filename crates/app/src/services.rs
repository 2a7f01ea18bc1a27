//! Application services: use-case orchestration over ports.
//!
//! Every service method takes the acting [`Identity`](roomhub_domain::user::Identity)
//! explicitly and checks the ownership policy before touching storage.

pub mod auth_service;
pub mod device_service;
pub mod room_service;
pub mod settings_service;
pub mod value_service;

pub use auth_service::AuthService;
pub use device_service::DeviceService;
pub use room_service::RoomService;
pub use settings_service::SettingsService;
pub use value_service::ValueService;
