//! `petget-client` — authenticated HTTP access to the PetGet backend.
//!
//! One [`ApiClient`] per process wraps a configured `reqwest` client with two
//! interceptor stages: outbound header injection (bearer token + tenant
//! scope, read from the injected [`petget_session::SessionContext`]) and
//! inbound authentication-failure handling (at most one coalesced token
//! renewal per request, terminal session expiry otherwise). Auth operations
//! (login, refresh, logout, validate) and the typed resource helpers are
//! implemented on the same client.

pub mod auth;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod resource;
pub mod telemetry;

pub use auth::{LoginResponse, RefreshResponse};
pub use config::ApiConfig;
pub use error::ApiError;
pub use pipeline::{ApiClient, ApiRequest, SessionExpiredHook};
pub use resource::{Page, PageQuery};
