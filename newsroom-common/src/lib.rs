//! # Newsroom Common Library
//!
//! Shared code for the newsroom service and its tooling:
//! - Error and result types
//! - Configuration loading (CLI, environment, TOML file, compiled defaults)
//! - Database initialization and shared row models
//! - Credential hashing and session tokens
//! - Timestamp helpers

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
