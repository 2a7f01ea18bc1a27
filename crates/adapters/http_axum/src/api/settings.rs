//! JSON REST handlers for the installation settings.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use roomhub_domain::device::parse_ip;
use roomhub_domain::error::HubError;
use roomhub_domain::settings::Settings;

use super::required;
use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::state::{AppState, Backend};

/// Request body for replacing the settings.
#[derive(Deserialize)]
pub struct UpdateSettingsRequest {
    #[serde(default)]
    pub broker_ip: Option<String>,
}

/// Possible responses from the settings endpoints.
pub enum SettingsResponse {
    Ok(Json<Settings>),
}

impl IntoResponse for SettingsResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/settings`
pub async fn get<B: Backend>(
    State(state): State<AppState<B>>,
    Authenticated(identity): Authenticated,
) -> Result<SettingsResponse, ApiError> {
    let settings = state.settings_service.get(&identity).await?;
    Ok(SettingsResponse::Ok(Json(settings)))
}

/// `PUT /api/settings`
pub async fn update<B: Backend>(
    State(state): State<AppState<B>>,
    Authenticated(identity): Authenticated,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<SettingsResponse, ApiError> {
    let broker_ip = parse_ip(&required(req.broker_ip, "broker_ip")?).map_err(HubError::from)?;
    let settings = state
        .settings_service
        .update(&identity, Settings { broker_ip })
        .await?;
    Ok(SettingsResponse::Ok(Json(settings)))
}
