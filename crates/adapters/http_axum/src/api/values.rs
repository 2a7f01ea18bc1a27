//! JSON REST handlers for device readings.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;

use roomhub_domain::device::DeviceKind;
use roomhub_domain::id::{DeviceId, ValueId};
use roomhub_domain::value::{Reading, Value, ValueChanges};

use super::{parse_id, required};
use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::state::{AppState, Backend};

/// Request body shared by create, replace and patch.
#[derive(Deserialize)]
pub struct ValueRequest {
    #[serde(default)]
    pub device: Option<DeviceId>,
    #[serde(default)]
    pub value: Option<Reading>,
}

impl From<ValueRequest> for ValueChanges {
    fn from(req: ValueRequest) -> Self {
        Self {
            device_id: req.device,
            reading: req.value,
        }
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Value>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get, replace and patch endpoints.
pub enum GetResponse {
    Ok(Json<Value>),
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
    Created(Json<Value>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
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

/// `GET /api/{kind}-values`
pub async fn list<B: Backend>(
    State(state): State<AppState<B>>,
    Extension(kind): Extension<DeviceKind>,
    Authenticated(identity): Authenticated,
) -> Result<ListResponse, ApiError> {
    let values = state.value_service.list(&identity, kind).await?;
    Ok(ListResponse::Ok(Json(values)))
}

/// `GET /api/{kind}-values/{id}`
pub async fn get<B: Backend>(
    State(state): State<AppState<B>>,
    Extension(kind): Extension<DeviceKind>,
    Authenticated(identity): Authenticated,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError> {
    let value_id: ValueId = parse_id(&id)?;
    let value = state.value_service.get(&identity, kind, value_id).await?;
    Ok(GetResponse::Ok(Json(value)))
}

/// `POST /api/{kind}-values`
pub async fn create<B: Backend>(
    State(state): State<AppState<B>>,
    Extension(kind): Extension<DeviceKind>,
    Authenticated(identity): Authenticated,
    Json(req): Json<ValueRequest>,
) -> Result<CreateResponse, ApiError> {
    let device_id = required(req.device, "device")?;
    let reading = required(req.value, "value")?;
    let value = state
        .value_service
        .create(&identity, kind, device_id, reading)
        .await?;
    Ok(CreateResponse::Created(Json(value)))
}

/// `PUT /api/{kind}-values/{id}`
pub async fn replace<B: Backend>(
    State(state): State<AppState<B>>,
    Extension(kind): Extension<DeviceKind>,
    Authenticated(identity): Authenticated,
    Path(id): Path<String>,
    Json(req): Json<ValueRequest>,
) -> Result<GetResponse, ApiError> {
    let value_id: ValueId = parse_id(&id)?;
    let value = state
        .value_service
        .update(&identity, kind, value_id, req.into(), false)
        .await?;
    Ok(GetResponse::Ok(Json(value)))
}

/// `PATCH /api/{kind}-values/{id}`
pub async fn patch<B: Backend>(
    State(state): State<AppState<B>>,
    Extension(kind): Extension<DeviceKind>,
    Authenticated(identity): Authenticated,
    Path(id): Path<String>,
    Json(req): Json<ValueRequest>,
) -> Result<GetResponse, ApiError> {
    let value_id: ValueId = parse_id(&id)?;
    let value = state
        .value_service
        .update(&identity, kind, value_id, req.into(), true)
        .await?;
    Ok(GetResponse::Ok(Json(value)))
}

/// `DELETE /api/{kind}-values/{id}`
pub async fn delete<B: Backend>(
    State(state): State<AppState<B>>,
    Extension(kind): Extension<DeviceKind>,
    Authenticated(identity): Authenticated,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError> {
    let value_id: ValueId = parse_id(&id)?;
    state.value_service.delete(&identity, kind, value_id).await?;
    Ok(DeleteResponse::NoContent)
}
