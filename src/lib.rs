//! # `project_tracker`
//!
//! Projects, their tasks, and a paginated JSON API over them.
//!
//! - [`tracker`]: domain types, list queries, and SQLite storage.
//! - [`resources`]: the JSON shapes the API sends and the client reads.
//! - [`api`]: the HTTP server (feature `server`).
//! - [`client`]: API client with list/detail state (feature `client`).
//! - [`reminders`]: scan for tasks left pending too long.

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;
pub mod reminders;
pub mod resources;
pub mod tracker;

#[cfg(feature = "server")]
pub mod api;
#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "client")]
pub mod client;

pub use error::{Error, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
