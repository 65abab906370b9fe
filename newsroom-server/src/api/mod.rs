//! HTTP API handlers for newsroom-server

pub mod admin;
pub mod auth;
pub mod health;
pub mod public;
pub mod reporter;
pub mod ui;

pub use auth::{require_admin, require_reporter, SESSION_COOKIE};
pub use health::health_routes;
