//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod accounts;
#[allow(clippy::missing_errors_doc)]
pub mod devices;
#[allow(clippy::missing_errors_doc)]
pub mod rooms;
#[allow(clippy::missing_errors_doc)]
pub mod settings;
#[allow(clippy::missing_errors_doc)]
pub mod values;

use std::str::FromStr;

use axum::routing::{get, patch, post};
use axum::{Extension, Router};

use roomhub_domain::device::DeviceKind;
use roomhub_domain::error::{HubError, ValidationError};

use crate::error::ApiError;
use crate::state::{AppState, Backend};

/// Build the `/api` sub-router.
///
/// Device and value routes are mounted once per [`DeviceKind`], each copy
/// carrying its kind as a request extension.
pub fn routes<B: Backend>() -> Router<AppState<B>> {
    let mut router = Router::new()
        // Accounts
        .route("/accounts/register", post(accounts::register::<B>))
        .route("/accounts/login", post(accounts::login::<B>))
        .route("/accounts/token/refresh", post(accounts::refresh::<B>))
        .route("/accounts/logout", post(accounts::logout::<B>))
        .route("/accounts/me", get(accounts::me))
        // Rooms
        .route("/rooms", get(rooms::list::<B>).post(rooms::create::<B>))
        .route(
            "/rooms/{id}",
            get(rooms::get::<B>)
                .put(rooms::update::<B>)
                .delete(rooms::delete::<B>),
        )
        // Settings
        .route("/settings", get(settings::get::<B>).put(settings::update::<B>));

    for kind in DeviceKind::ALL {
        let device_path = format!("/{}-devices", kind.as_str());
        let value_path = format!("/{}-values", kind.as_str());
        router = router
            .route(
                &device_path,
                get(devices::list::<B>)
                    .post(devices::create::<B>)
                    .layer(Extension(kind)),
            )
            .route(
                &format!("{device_path}/{{id}}"),
                get(devices::get::<B>)
                    .put(devices::update::<B>)
                    .delete(devices::delete::<B>)
                    .layer(Extension(kind)),
            )
            .route(
                &format!("{device_path}/{{id}}/activate"),
                patch(devices::activate::<B>).layer(Extension(kind)),
            )
            .route(
                &value_path,
                get(values::list::<B>)
                    .post(values::create::<B>)
                    .layer(Extension(kind)),
            )
            .route(
                &format!("{value_path}/{{id}}"),
                get(values::get::<B>)
                    .put(values::replace::<B>)
                    .patch(values::patch::<B>)
                    .delete(values::delete::<B>)
                    .layer(Extension(kind)),
            );
    }
    router
}

/// Parse a path segment into a typed id.
fn parse_id<T: FromStr>(raw: &str) -> Result<T, ApiError> {
    T::from_str(raw)
        .map_err(|_| HubError::from(ValidationError::InvalidId(raw.to_string())).into())
}

/// Unwrap a field the request body must carry.
fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ApiError> {
    value.ok_or_else(|| HubError::from(ValidationError::MissingField { field }).into())
}
