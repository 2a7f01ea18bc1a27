//! # roomhub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `roomhub-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//! - Push ownership scoping down into the queries
//!
//! ## Dependency rule
//! Depends on `roomhub-app` (for port traits) and `roomhub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod device_repo;
mod error;
mod pool;
mod room_repo;
mod settings_repo;
mod token_repo;
mod user_repo;
mod value_repo;

pub use device_repo::SqliteDeviceRepository;
pub use error::StorageError;
pub use pool::{Config, Database};
pub use room_repo::SqliteRoomRepository;
pub use settings_repo::SqliteSettingsRepository;
pub use token_repo::SqliteTokenRepository;
pub use user_repo::SqliteUserRepository;
pub use value_repo::SqliteValueRepository;

use roomhub_domain::policy::Scope;

/// Owner to filter on, or `NULL` for an unrestricted listing.
fn owner_filter(scope: Scope) -> Option<i64> {
    match scope {
        Scope::All => None,
        Scope::OwnedBy(user_id) => Some(user_id.as_i64()),
    }
}
