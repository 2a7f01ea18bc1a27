//! JSON REST handlers for rooms.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use roomhub_domain::id::{RoomId, UserId};
use roomhub_domain::room::{Room, RoomChanges};
use roomhub_domain::room_view::RoomView;

use super::{parse_id, required};
use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::state::{AppState, Backend};

/// Request body for creating a room. `owner` defaults to the caller.
#[derive(Deserialize)]
pub struct CreateRoomRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub owner: Option<UserId>,
}

/// Request body for updating a room; absent fields are kept.
#[derive(Deserialize)]
pub struct UpdateRoomRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub owner: Option<UserId>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<RoomView>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<RoomView>),
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
    Created(Json<Room>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the update endpoint.
pub enum UpdateResponse {
    Ok(Json<Room>),
}

impl IntoResponse for UpdateResponse {
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

/// `GET /api/rooms`
pub async fn list<B: Backend>(
    State(state): State<AppState<B>>,
    Authenticated(identity): Authenticated,
) -> Result<ListResponse, ApiError> {
    let rooms = state.room_service.list(&identity).await?;
    Ok(ListResponse::Ok(Json(rooms)))
}

/// `GET /api/rooms/{id}`
pub async fn get<B: Backend>(
    State(state): State<AppState<B>>,
    Authenticated(identity): Authenticated,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError> {
    let room_id: RoomId = parse_id(&id)?;
    let room = state.room_service.get(&identity, room_id).await?;
    Ok(GetResponse::Ok(Json(room)))
}

/// `POST /api/rooms`
pub async fn create<B: Backend>(
    State(state): State<AppState<B>>,
    Authenticated(identity): Authenticated,
    Json(req): Json<CreateRoomRequest>,
) -> Result<CreateResponse, ApiError> {
    let name = required(req.name, "name")?;
    let room = state
        .room_service
        .create(&identity, name, req.owner)
        .await?;
    Ok(CreateResponse::Created(Json(room)))
}

/// `PUT /api/rooms/{id}`
pub async fn update<B: Backend>(
    State(state): State<AppState<B>>,
    Authenticated(identity): Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdateRoomRequest>,
) -> Result<UpdateResponse, ApiError> {
    let room_id: RoomId = parse_id(&id)?;
    let changes = RoomChanges {
        name: req.name,
        owner_id: req.owner,
    };
    let room = state
        .room_service
        .update(&identity, room_id, changes)
        .await?;
    Ok(UpdateResponse::Ok(Json(room)))
}

/// `DELETE /api/rooms/{id}`
pub async fn delete<B: Backend>(
    State(state): State<AppState<B>>,
    Authenticated(identity): Authenticated,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError> {
    let room_id: RoomId = parse_id(&id)?;
    state.room_service.delete(&identity, room_id).await?;
    Ok(DeleteResponse::NoContent)
}
