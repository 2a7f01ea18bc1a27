//! # roomhub-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `UserRepository`, `TokenRepository`: accounts and issued tokens
//!   - `RoomRepository`, `DeviceRepository`, `ValueRepository`: the registry,
//!     with ownership-scoped listings
//!   - `SettingsRepository`: the installation settings singleton
//!   - `PasswordHasher`: one-way credential hashing
//! - Define **driving/inbound ports** as use-case structs:
//!   - `AuthService`: register, login, authenticate, refresh
//!   - `RoomService`: room CRUD and the aggregated room view
//!   - `DeviceService`, `ValueService`: one generic manager per resource,
//!     parameterized by device kind
//!   - `SettingsService`: read and replace settings
//! - Enforce the ownership policy from `roomhub-domain` before every mutation
//!
//! ## Dependency rule
//! Depends on `roomhub-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;
