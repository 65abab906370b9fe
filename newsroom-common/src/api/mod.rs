//! Shared authentication primitives
//!
//! Pure functions only: no HTTP framework dependencies. The server crate
//! wraps these with its session extractor and role guards.

pub mod auth;

pub use auth::{
    create_credentials, generate_salt, generate_session_token, hash_password, verify_password,
    CredentialError,
};
