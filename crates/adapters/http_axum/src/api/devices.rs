//! JSON REST handlers for devices.
//!
//! The same handlers serve all three kinds; the router attaches the
//! [`DeviceKind`] of each mount point as a request extension.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use roomhub_domain::device::{Device, DeviceChanges, DeviceKind, NewDevice, parse_ip};
use roomhub_domain::error::{HubError, ValidationError};
use roomhub_domain::id::{DeviceId, RoomId};

use super::{parse_id, required};
use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::state::{AppState, Backend};

/// Request body for creating a device.
#[derive(Deserialize)]
pub struct CreateDeviceRequest {
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub room: Option<RoomId>,
    #[serde(default)]
    pub protocol_name: Option<String>,
}

/// Request body for updating a device; absent fields are kept.
#[derive(Deserialize)]
pub struct UpdateDeviceRequest {
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub room: Option<RoomId>,
    #[serde(default)]
    pub protocol_name: Option<String>,
}

/// Optional body of the activate endpoint. Without it the flag is toggled.
#[derive(Deserialize)]
pub struct ActivateRequest {
    #[serde(default)]
    pub active: Option<bool>,
}

/// Body returned by the activate endpoint.
#[derive(Serialize)]
pub struct ActivateBody {
    pub status: &'static str,
    pub active: bool,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Device>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and update endpoints.
pub enum GetResponse {
    Ok(Json<Device>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Device>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the activate endpoint.
pub enum ActivateResponse {
    Ok(Json<ActivateBody>),
}

impl IntoResponse for ActivateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /api/{kind}-devices`
pub async fn list<B: Backend>(
    State(state): State<AppState<B>>,
    Extension(kind): Extension<DeviceKind>,
    Authenticated(identity): Authenticated,
) -> Result<ListResponse, ApiError> {
    let devices = state.device_service.list(&identity, kind).await?;
    Ok(ListResponse::Ok(Json(devices)))
}

/// `GET /api/{kind}-devices/{id}`
pub async fn get<B: Backend>(
    State(state): State<AppState<B>>,
    Extension(kind): Extension<DeviceKind>,
    Authenticated(identity): Authenticated,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError> {
    let device_id: DeviceId = parse_id(&id)?;
    let device = state.device_service.get(&identity, kind, device_id).await?;
    Ok(GetResponse::Ok(Json(device)))
}

/// `POST /api/{kind}-devices`
pub async fn create<B: Backend>(
    State(state): State<AppState<B>>,
    Extension(kind): Extension<DeviceKind>,
    Authenticated(identity): Authenticated,
    Json(req): Json<CreateDeviceRequest>,
) -> Result<CreateResponse, ApiError> {
    let device = NewDevice {
        kind,
        mac_address: required(req.mac_address, "mac_address")?,
        name: required(req.name, "name")?,
        ip: parse_ip(&required(req.ip, "ip")?).map_err(HubError::from)?,
        room_id: required(req.room, "room")?,
        protocol_name: req.protocol_name,
    };
    let device = state.device_service.create(&identity, device).await?;
    Ok(CreateResponse::Created(Json(device)))
}

/// `PUT /api/{kind}-devices/{id}`
pub async fn update<B: Backend>(
    State(state): State<AppState<B>>,
    Extension(kind): Extension<DeviceKind>,
    Authenticated(identity): Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdateDeviceRequest>,
) -> Result<GetResponse, ApiError> {
    let device_id: DeviceId = parse_id(&id)?;
    let changes = DeviceChanges {
        mac_address: req.mac_address,
        name: req.name,
        ip: req
            .ip
            .as_deref()
            .map(parse_ip)
            .transpose()
            .map_err(HubError::from)?,
        room_id: req.room,
        protocol_name: req.protocol_name,
    };
    let device = state
        .device_service
        .update(&identity, kind, device_id, changes)
        .await?;
    Ok(GetResponse::Ok(Json(device)))
}

/// `PATCH /api/{kind}-devices/{id}/activate`
pub async fn activate<B: Backend>(
    State(state): State<AppState<B>>,
    Extension(kind): Extension<DeviceKind>,
    Authenticated(identity): Authenticated,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<ActivateResponse, ApiError> {
    let device_id: DeviceId = parse_id(&id)?;
    let requested = requested_state(&body)?;
    let device = state
        .device_service
        .activate(&identity, kind, device_id, requested)
        .await?;
    Ok(ActivateResponse::Ok(Json(ActivateBody {
        status: "success",
        active: device.active,
    })))
}

/// `DELETE /api/{kind}-devices/{id}`
pub async fn delete<B: Backend>(
    State(state): State<AppState<B>>,
    Extension(kind): Extension<DeviceKind>,
    Authenticated(identity): Authenticated,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError> {
    let device_id: DeviceId = parse_id(&id)?;
    state
        .device_service
        .delete(&identity, kind, device_id)
        .await?;
    Ok(DeleteResponse::NoContent)
}

/// Read the `active` flag from an activate body. An empty body means toggle.
fn requested_state(body: &[u8]) -> Result<Option<bool>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let req: ActivateRequest = serde_json::from_slice(body)
        .map_err(|err| HubError::from(ValidationError::MalformedBody(err.to_string())))?;
    Ok(req.active)
}
