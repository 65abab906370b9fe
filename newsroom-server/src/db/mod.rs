//! Database access layer for the newsroom service
//!
//! Schema creation lives in `newsroom_common::db`; this module holds the
//! queries the HTTP handlers run against the shared pool.

pub mod metrics;
pub mod news;
pub mod sessions;
pub mod users;

pub use news::{AssociatedMedia, Location, NewsDocument, NewsFilter, SearchMethod};
pub use sessions::Session;
pub use users::{NewUser, UserRecord};
