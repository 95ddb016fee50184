//! CRM core services.
//!
//! Every service takes the calling [`auth::Actor`] explicitly and, where the
//! clock matters, the current instant as a parameter. Writes run inside a
//! single database transaction per call.

pub mod access;
pub mod activity;
pub mod auth;
pub mod cadence;
pub mod conversion;
pub mod ownership;
pub mod schema;
pub mod seed;
pub mod sharing;
pub mod users;

pub use auth::{Actor, AuthConfig, UserRole};
pub use platform_api::{ApiError, ApiResult};
pub use schema::{build_schema, CrmSchema};
