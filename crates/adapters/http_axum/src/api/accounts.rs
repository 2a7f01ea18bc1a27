//! JSON REST handlers for accounts and tokens.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use roomhub_domain::error::{HubError, ValidationError};
use roomhub_domain::id::UserId;
use roomhub_domain::token::TokenPair;
use roomhub_domain::user::Identity;

use super::required;
use crate::auth::{Authenticated, bearer_token};
use crate::error::ApiError;
use crate::state::{AppState, Backend};

/// Request body for registering an account.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Request body for logging in.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Request body for refreshing an access token.
#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

/// Optional request body for logging out.
#[derive(Deserialize)]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Tokens returned on login, with the id of the account.
#[derive(Serialize)]
pub struct LoginBody {
    pub userid: UserId,
    pub refresh: String,
    pub access: String,
}

/// Possible responses from the register endpoint.
pub enum RegisterResponse {
    Created(Json<TokenPair>),
}

impl IntoResponse for RegisterResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the login endpoint.
pub enum LoginResponse {
    Ok(Json<LoginBody>),
}

impl IntoResponse for LoginResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the refresh endpoint.
pub enum RefreshResponse {
    Ok(Json<TokenPair>),
}

impl IntoResponse for RefreshResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the logout endpoint.
pub enum LogoutResponse {
    NoContent,
}

impl IntoResponse for LogoutResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `POST /api/accounts/register`
pub async fn register<B: Backend>(
    State(state): State<AppState<B>>,
    Json(req): Json<RegisterRequest>,
) -> Result<RegisterResponse, ApiError> {
    let username = required(req.username, "username")?;
    let password = required(req.password, "password")?;
    let (_, pair) = state
        .auth_service
        .register(&username, &password, req.email)
        .await?;
    Ok(RegisterResponse::Created(Json(pair)))
}

/// `POST /api/accounts/login`
pub async fn login<B: Backend>(
    State(state): State<AppState<B>>,
    Json(req): Json<LoginRequest>,
) -> Result<LoginResponse, ApiError> {
    let username = required(req.username, "username")?;
    let password = required(req.password, "password")?;
    let (userid, pair) = state.auth_service.login(&username, &password).await?;
    Ok(LoginResponse::Ok(Json(LoginBody {
        userid,
        refresh: pair.refresh,
        access: pair.access,
    })))
}

/// `POST /api/accounts/token/refresh`
pub async fn refresh<B: Backend>(
    State(state): State<AppState<B>>,
    Json(req): Json<RefreshRequest>,
) -> Result<RefreshResponse, ApiError> {
    let refresh = required(req.refresh, "refresh")?;
    let pair = state.auth_service.refresh(&refresh).await?;
    Ok(RefreshResponse::Ok(Json(pair)))
}

/// `POST /api/accounts/logout`
///
/// Revokes the bearer token and, when the body names one, the caller's
/// refresh token.
pub async fn logout<B: Backend>(
    State(state): State<AppState<B>>,
    Authenticated(identity): Authenticated,
    headers: HeaderMap,
    body: Bytes,
) -> Result<LogoutResponse, ApiError> {
    let access = bearer_token(&headers)?;
    let refresh = logout_refresh(&body)?;
    state
        .auth_service
        .logout(&identity, access, refresh.as_deref())
        .await?;
    Ok(LogoutResponse::NoContent)
}

/// `GET /api/accounts/me`
pub async fn me(Authenticated(identity): Authenticated) -> Json<Identity> {
    Json(identity)
}

/// Read the optional refresh token from a logout body. An empty body is allowed.
fn logout_refresh(body: &[u8]) -> Result<Option<String>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let req: LogoutRequest = serde_json::from_slice(body)
        .map_err(|err| HubError::from(ValidationError::MalformedBody(err.to_string())))?;
    Ok(req.refresh)
}
