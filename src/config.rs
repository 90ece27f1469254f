//! Run configuration
//!
//! All input for a run comes from a single JSON file, read once at startup
//! and immutable afterwards. The file path is taken from the
//! `ONBOARD_CONFIG` environment variable, falling back to `onboard.json` in
//! the working directory.

use crate::error::OnboardError;
use serde::Deserialize;
use std::env;
use std::path::Path;

/// Production endpoint of the aggregation service
const DEFAULT_API_URL: &str = "https://api.figo.me/v3";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_poll_max_attempts() -> u32 {
    60
}

/// Top-level run configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the aggregation service. Overridable so tests can point
    /// the run at a local mock server.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Application identity used for the connection
    pub app: AppConfig,
    /// User to provision and authenticate
    pub user: UserConfig,
    /// Bank account to link
    pub account: AccountConfig,
    /// Task polling knobs
    #[serde(default)]
    pub poll: PollConfig,
}

/// Application identity (client id + secret)
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// OAuth client id issued for the application
    pub client_id: String,
    /// OAuth client secret issued for the application
    pub client_secret: String,
}

/// User to provision and authenticate
#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    /// Display name for provisioning
    pub name: String,
    /// Login email
    pub email: String,
    /// Login password
    pub password: String,
}

/// Bank account to link
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    /// Two-letter country code of the bank
    pub country: String,
    /// Online-banking credentials, in the order the bank expects them
    pub credentials: Vec<String>,
    /// Bank code (e.g. German BLZ) identifying the institution
    pub bank_code: String,
    /// Optional IBAN. Absence is an explicit "no value" sent as JSON `null`
    /// on the wire, never an omitted field.
    #[serde(default)]
    pub iban: Option<String>,
    /// Whether the service may store the banking PIN
    #[serde(default)]
    pub save_pin: bool,
}

/// Fixed-interval polling budget for the account setup task
#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    /// Wait between status queries, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
    /// Status queries issued before the poller gives up
    #[serde(default = "default_poll_max_attempts")]
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
            max_attempts: default_poll_max_attempts(),
        }
    }
}

impl Config {
    /// Load configuration from the path in `ONBOARD_CONFIG`, falling back to
    /// `onboard.json`.
    pub fn load() -> Result<Self, OnboardError> {
        let path = env::var("ONBOARD_CONFIG").unwrap_or_else(|_| "onboard.json".to_string());
        Self::from_file(Path::new(&path))
    }

    /// Read and parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, OnboardError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| OnboardError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| OnboardError::Config(format!("cannot parse {}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FULL_CONFIG: &str = r#"{
        "api_url": "https://api.example.test/v3",
        "app": { "client_id": "cid", "client_secret": "csecret" },
        "user": { "name": "Jane Doe", "email": "jane@example.test", "password": "pw" },
        "account": {
            "country": "de",
            "credentials": ["jane", "12345"],
            "bank_code": "90090042",
            "iban": "DE89370400440532013000",
            "save_pin": true
        },
        "poll": { "interval_ms": 250, "max_attempts": 8 }
    }"#;

    const MINIMAL_CONFIG: &str = r#"{
        "app": { "client_id": "cid", "client_secret": "csecret" },
        "user": { "name": "Jane Doe", "email": "jane@example.test", "password": "pw" },
        "account": {
            "country": "de",
            "credentials": ["jane", "12345"],
            "bank_code": "90090042"
        }
    }"#;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(contents.as_bytes())
            .expect("Failed to write config");
        file
    }

    #[test]
    fn parses_a_full_config_file() {
        let file = write_config(FULL_CONFIG);
        let config = Config::from_file(file.path()).unwrap();

        assert_eq!(config.api_url, "https://api.example.test/v3");
        assert_eq!(config.app.client_id, "cid");
        assert_eq!(config.user.email, "jane@example.test");
        assert_eq!(config.account.credentials.len(), 2);
        assert_eq!(config.account.iban.as_deref(), Some("DE89370400440532013000"));
        assert!(config.account.save_pin);
        assert_eq!(config.poll.interval_ms, 250);
        assert_eq!(config.poll.max_attempts, 8);
    }

    #[test]
    fn missing_optional_fields_fall_back_to_defaults() {
        let file = write_config(MINIMAL_CONFIG);
        let config = Config::from_file(file.path()).unwrap();

        assert_eq!(config.api_url, "https://api.figo.me/v3");
        assert_eq!(config.account.iban, None);
        assert!(!config.account.save_pin);
        assert_eq!(config.poll.interval_ms, 1000);
        assert_eq!(config.poll.max_attempts, 60);
    }

    #[test]
    fn unreadable_file_is_a_config_error() {
        let result = Config::from_file(Path::new("/nonexistent/onboard.json"));
        assert!(matches!(result, Err(OnboardError::Config(_))));
        assert!(result.unwrap_err().to_string().contains("cannot read"));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let file = write_config("not json at all");
        let result = Config::from_file(file.path());
        assert!(matches!(result, Err(OnboardError::Config(_))));
        assert!(result.unwrap_err().to_string().contains("cannot parse"));
    }

    #[test]
    #[serial_test::serial]
    fn load_honors_the_config_path_env_var() {
        let file = write_config(MINIMAL_CONFIG);
        let original = env::var("ONBOARD_CONFIG").ok();

        env::set_var("ONBOARD_CONFIG", file.path());
        let config = Config::load().unwrap();
        assert_eq!(config.app.client_id, "cid");

        match original {
            Some(value) => env::set_var("ONBOARD_CONFIG", value),
            None => env::remove_var("ONBOARD_CONFIG"),
        }
    }
}
