//! # roomhub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **JSON REST API** (`/api/rooms`, `/api/{kind}-devices`,
//!   `/api/{kind}-values`, `/api/settings`, `/api/accounts/...`)
//! - Resolve the caller from the `Authorization: Bearer` header
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map application results and errors into HTTP responses
//!
//! ## Dependency rule
//! Depends on `roomhub-app` (for port traits and services) and
//! `roomhub-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod auth;
pub mod error;
pub mod router;
pub mod state;
