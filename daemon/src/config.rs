//! Daemon configuration with TOML file support.
//!
//! The file carries everything non-secret. Secrets (district API key,
//! SMTP credentials, sheet token, admin token) come from the environment
//! and are layered on top — they never appear in the file or in code.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("config error: {0}")]
pub struct ConfigError(pub String);

/// Which tabular backend holds the signatures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Local CSV file.
    #[default]
    Csv,
    /// Remote worksheet service.
    Sheets,
}

/// Configuration for the pledge daemon.
///
/// Can be loaded from a TOML file via [`PledgeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PledgeConfig {
    /// Port for the HTTP API.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Primary signature store backend.
    #[serde(default)]
    pub backend: StoreBackend,

    /// CSV file path (csv backend, and the `reset` subcommand).
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,

    /// Backup sink path; `None` disables the backup sink.
    #[serde(default = "default_backup_path")]
    pub backup_path: Option<PathBuf>,

    /// Shrink-guard floor: refuse writes when the store reads back fewer
    /// rows than this. 0 disables the floor; raise it (e.g. to 50) once
    /// the store is seeded, so a false-empty read can never wipe it.
    #[serde(default)]
    pub shrink_floor: u64,

    /// Whether identity submission requires the emailed code challenge.
    /// Disabling it selects the simpler commit-immediately variant.
    #[serde(default = "default_true")]
    pub require_email_verification: bool,

    /// Free-text address search endpoint.
    #[serde(default = "default_search_url")]
    pub search_base_url: String,

    /// User-Agent identifying this deployment to the search service.
    #[serde(default = "default_search_user_agent")]
    pub search_user_agent: String,

    /// District resolution endpoint.
    #[serde(default = "default_district_url")]
    pub district_base_url: String,

    /// Sheet service base URL (sheets backend).
    #[serde(default)]
    pub sheets_base_url: String,

    /// Worksheet holding the signatures (sheets backend).
    #[serde(default = "default_worksheet")]
    pub sheets_worksheet: String,

    /// Outbound mail relay host.
    #[serde(default = "default_smtp_relay")]
    pub smtp_relay: String,

    /// From mailbox for verification emails, e.g. `Pledge <a@b.org>`.
    #[serde(default)]
    pub smtp_from: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_listen_port() -> u16 {
    8080
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("./pledges.csv")
}

fn default_backup_path() -> Option<PathBuf> {
    Some(PathBuf::from("./pledges_backup.csv"))
}

fn default_true() -> bool {
    true
}

fn default_search_url() -> String {
    "https://nominatim.openstreetmap.org/search".to_string()
}

fn default_search_user_agent() -> String {
    "pledge-signup/0.1".to_string()
}

fn default_district_url() -> String {
    "https://api.geocod.io/v1.7/geocode".to_string()
}

fn default_worksheet() -> String {
    "pledges".to_string()
}

fn default_smtp_relay() -> String {
    "smtp.gmail.com".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl PledgeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError(e.to_string()))
    }
}

impl Default for PledgeConfig {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            backend: StoreBackend::default(),
            csv_path: default_csv_path(),
            backup_path: default_backup_path(),
            shrink_floor: 0,
            require_email_verification: true,
            search_base_url: default_search_url(),
            search_user_agent: default_search_user_agent(),
            district_base_url: default_district_url(),
            sheets_base_url: String::new(),
            sheets_worksheet: default_worksheet(),
            smtp_relay: default_smtp_relay(),
            smtp_from: String::new(),
        }
    }
}

/// Secrets supplied only through the environment.
#[derive(Clone, Debug, Default)]
pub struct Secrets {
    pub district_api_key: Option<String>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub sheets_token: Option<String>,
    pub admin_token: Option<String>,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self {
            district_api_key: std::env::var("PLEDGE_DISTRICT_API_KEY").ok(),
            smtp_username: std::env::var("PLEDGE_SMTP_USERNAME").ok(),
            smtp_password: std::env::var("PLEDGE_SMTP_PASSWORD").ok(),
            sheets_token: std::env::var("PLEDGE_SHEETS_TOKEN").ok(),
            admin_token: std::env::var("PLEDGE_ADMIN_TOKEN").ok(),
        }
    }
}
