//! Configuration management for project-tracker.
//!
//! Settings live in `project-tracker.yaml`, split into a `server` and a
//! `client` section. Every field has a default, so a partial file (or no file
//! at all) is valid. A few settings can be overridden from the environment,
//! including variables loaded from a `.env` file.

use crate::error::{Error, Result};
use crate::paths;
use crate::reminders::MAX_REMINDER_AGE_DAYS;
use crate::tracker::query::{PageLimits, DEFAULT_PER_PAGE, MAX_PER_PAGE};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Config file name, relative to the working directory.
pub const CONFIG_FILE_NAME: &str = "project-tracker.yaml";

/// Overrides [`ServerConfig::bind`].
pub const BIND_ENV: &str = "TRACKER_BIND";

/// Overrides [`ServerConfig::database_path`].
pub const DATABASE_ENV: &str = "TRACKER_DATABASE";

/// Overrides [`ClientConfig::base_url`].
pub const API_URL_ENV: &str = "TRACKER_API_URL";

/// Reminder threshold when none is configured.
pub const DEFAULT_REMINDER_MAX_AGE_DAYS: u32 = 7;

/// Top-level configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// API client settings.
    pub client: ClientConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: String,

    /// Database file. `None` means `~/.project-tracker/tracker.sqlite3`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Page size for list requests without `per_page`.
    pub default_per_page: u32,

    /// Largest accepted `per_page`.
    pub max_per_page: u32,

    /// Pending tasks older than this many days are reported by the reminder scan.
    pub reminder_max_age_days: u32,

    /// Run the reminder scan this often while serving. `None` disables it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_interval_secs: Option<u64>,

    /// Logging settings.
    pub log: LogConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            database_path: None,
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: MAX_PER_PAGE,
            reminder_max_age_days: DEFAULT_REMINDER_MAX_AGE_DAYS,
            reminder_interval_secs: None,
            log: LogConfig::default(),
        }
    }
}

impl ServerConfig {
    /// The configured database path, or the default one.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.database_path.clone().unwrap_or_else(paths::default_db_path)
    }

    /// Page size bounds for list requests.
    #[must_use]
    pub const fn page_limits(&self) -> PageLimits {
        PageLimits { default_per_page: self.default_per_page, max_per_page: self.max_per_page }
    }

    /// Parse the bind address.
    ///
    /// # Errors
    ///
    /// Returns an error if `bind` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind
            .parse()
            .map_err(|e| Error::Config(format!("invalid bind address '{}': {e}", self.bind)))
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `info` or
    /// `project_tracker=debug,tower_http=info`.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

/// API client settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the API, including the `/api` prefix.
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { base_url: "http://localhost:8000/api".to_string() }
    }
}

impl Config {
    /// Load config from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(Some(config))
    }

    /// Save config to a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load the file (defaults if absent), apply environment overrides, and
    /// validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or the result is invalid.
    pub fn resolve(path: &Path) -> Result<Self> {
        // A missing .env file is fine.
        let _ = dotenvy::dotenv();

        let mut config = Self::load_from(path)?.unwrap_or_default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(bind) = get(BIND_ENV) {
            self.server.bind = bind;
        }
        if let Some(database) = get(DATABASE_ENV) {
            self.server.database_path = Some(PathBuf::from(database));
        }
        if let Some(url) = get(API_URL_ENV) {
            self.client.base_url = url;
        }
    }

    /// Check that the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let server = &self.server;
        if server.max_per_page == 0 {
            return Err(Error::Config("max_per_page must be at least 1".to_string()));
        }
        if server.default_per_page == 0 || server.default_per_page > server.max_per_page {
            return Err(Error::Config(format!(
                "default_per_page must be between 1 and max_per_page ({})",
                server.max_per_page
            )));
        }
        if server.reminder_max_age_days > MAX_REMINDER_AGE_DAYS {
            return Err(Error::Config(format!(
                "reminder_max_age_days must be at most {MAX_REMINDER_AGE_DAYS}"
            )));
        }
        server.bind_addr()?;
        if self.client.base_url.trim().is_empty() {
            return Err(Error::Config("client base_url must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Ensure a config file exists at `path`, writing defaults if not.
///
/// Returns the config (either loaded or newly created).
///
/// # Errors
///
/// Returns an error if config cannot be loaded or saved.
pub fn ensure_config_at(path: &Path) -> Result<Config> {
    if let Some(config) = Config::load_from(path)? {
        return Ok(config);
    }

    let config = Config::default();
    config.save_to(path)?;
    tracing::info!(path = %path.display(), "wrote default configuration");
    Ok(config)
}
