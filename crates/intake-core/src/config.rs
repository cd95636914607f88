//! Configuration resolution for the intake service.
//!
//! Resolution order (lowest to highest priority):
//! 1. Built-in defaults
//! 2. JSON settings file (`--config` / `INTAKE_CONFIG`)
//! 3. Environment variables (`INTAKE_*`)
//! 4. CLI arguments, applied by the binary

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::validation::Limits;

/// Secret used when none is configured. Fine for local development only.
pub const DEV_JWT_SECRET: &str = "dev-secret-change-me";

/// Complete intake service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub limits: Limits,
    pub notification: NotificationConfig,
    pub auth: AuthConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Origins allowed by CORS. Empty disables cross-origin access.
    pub allowed_origins: Vec<String>,
    /// Upper bound on a request body, in bytes. Must cover
    /// [`Limits::max_encoded_bytes`] so that no in-bounds submission is
    /// refused for its encoding.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
                "http://localhost:8080".to_string(),
            ],
            max_body_bytes: 192 * 1024,
        }
    }
}

/// Persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// `SQLite` file. `None` falls back to [`default_database_path`].
    pub database_path: Option<PathBuf>,
    /// Budget for a single inquiry write before it counts as unavailable.
    pub write_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            write_timeout_secs: 10,
        }
    }
}

/// Staff notification configuration.
///
/// Notification is enabled only when both `endpoint` and `staff_address`
/// are set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// HTTP endpoint of the transactional mail API.
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub from_address: String,
    pub staff_address: Option<String>,
    pub timeout_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            from_address: "no-reply@localhost".to_string(),
            staff_address: None,
            timeout_secs: 10,
        }
    }
}

impl NotificationConfig {
    pub const fn is_enabled(&self) -> bool {
        self.endpoint.is_some() && self.staff_address.is_some()
    }
}

/// Bearer-token verification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of tokens minted by `issue-token`, in seconds.
    pub token_ttl_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_secs: 3600,
        }
    }
}

impl Config {
    /// Check cross-field constraints after all layers are applied.
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(Error::Config("auth.jwt_secret must not be empty".into()));
        }
        if self.auth.token_ttl_secs <= 0 {
            return Err(Error::Config("auth.token_ttl_secs must be positive".into()));
        }
        if self.storage.write_timeout_secs == 0 {
            return Err(Error::Config(
                "storage.write_timeout_secs must be positive".into(),
            ));
        }
        if self.limits.max_message_chars == 0 {
            return Err(Error::Config(
                "limits.max_message_chars must be positive".into(),
            ));
        }
        let needed = self.limits.max_encoded_bytes();
        if self.server.max_body_bytes < needed {
            return Err(Error::Config(format!(
                "server.max_body_bytes ({}) is below the {needed} bytes a submission \
                 within limits can encode to",
                self.server.max_body_bytes
            )));
        }
        let n = &self.notification;
        if n.timeout_secs == 0 {
            return Err(Error::Config(
                "notification.timeout_secs must be positive".into(),
            ));
        }
        if n.endpoint.is_some() != n.staff_address.is_some() {
            return Err(Error::Config(
                "notification.endpoint and notification.staff_address must be set together"
                    .into(),
            ));
        }
        Ok(())
    }

    /// Database path, falling back to the per-user default.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.storage
            .database_path
            .clone()
            .or_else(default_database_path)
    }
}

/// Load configuration from defaults, an optional settings file, and the
/// process environment.
pub fn load_config(file: Option<&Path>) -> Result<Config> {
    let mut config = match file {
        Some(path) => load_config_file(path)?,
        None => Config::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

/// Default database location: `~/.intake/intake.db`.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".intake").join("intake.db"))
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {e}", path.display()))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {e}", path.display()))
    })
}

/// Apply `INTAKE_*` overrides read through `lookup`.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("INTAKE_ADDR") {
        config.server.addr = parse("INTAKE_ADDR", &val)?;
    }
    if let Some(val) = lookup("INTAKE_ALLOWED_ORIGINS") {
        config.server.allowed_origins = val
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(val) = lookup("INTAKE_MAX_BODY_BYTES") {
        config.server.max_body_bytes = parse("INTAKE_MAX_BODY_BYTES", &val)?;
    }
    if let Some(val) = lookup("INTAKE_DB_PATH") {
        config.storage.database_path = Some(PathBuf::from(val));
    }
    if let Some(val) = lookup("INTAKE_WRITE_TIMEOUT_SECS") {
        config.storage.write_timeout_secs = parse("INTAKE_WRITE_TIMEOUT_SECS", &val)?;
    }
    if let Some(val) = lookup("INTAKE_MAX_MESSAGE_CHARS") {
        config.limits.max_message_chars = parse("INTAKE_MAX_MESSAGE_CHARS", &val)?;
    }
    if let Some(val) = lookup("INTAKE_NOTIFY_ENDPOINT") {
        config.notification.endpoint = Some(val);
    }
    if let Some(val) = lookup("INTAKE_NOTIFY_API_KEY") {
        config.notification.api_key = Some(val);
    }
    if let Some(val) = lookup("INTAKE_NOTIFY_FROM") {
        config.notification.from_address = val;
    }
    if let Some(val) = lookup("INTAKE_STAFF_EMAIL") {
        config.notification.staff_address = Some(val);
    }
    if let Some(val) = lookup("INTAKE_JWT_SECRET") {
        config.auth.jwt_secret = val;
    }
    if let Some(val) = lookup("INTAKE_TOKEN_TTL_SECS") {
        config.auth.token_ttl_secs = parse("INTAKE_TOKEN_TTL_SECS", &val)?;
    }
    Ok(())
}

fn parse<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid {key} value {value:?}: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.limits.max_message_chars, 10_000);
        assert_eq!(config.storage.write_timeout_secs, 10);
        assert!(!config.notification.is_enabled());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"server":{"addr":"127.0.0.1:9000"},"limits":{"max_message_chars":500}}"#,
        )
        .unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.server.addr.port(), 9000);
        assert_eq!(
            config.server.max_body_bytes,
            ServerConfig::default().max_body_bytes
        );
        assert_eq!(config.limits.max_message_chars, 500);
        assert_eq!(config.limits.max_name_chars, 200);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = load_config_file(Path::new("/nonexistent/intake.json")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("INTAKE_ADDR", "127.0.0.1:7000"),
                (
                    "INTAKE_ALLOWED_ORIGINS",
                    "https://example.com, https://www.example.com,",
                ),
                ("INTAKE_NOTIFY_ENDPOINT", "https://mail.example.com/send"),
                ("INTAKE_STAFF_EMAIL", "sales@example.com"),
                ("INTAKE_WRITE_TIMEOUT_SECS", "3"),
            ]),
        )
        .unwrap();

        assert_eq!(config.server.addr.port(), 7000);
        assert_eq!(
            config.server.allowed_origins,
            vec!["https://example.com", "https://www.example.com"]
        );
        assert_eq!(config.storage.write_timeout_secs, 3);
        assert!(config.notification.is_enabled());
        config.validate().unwrap();
    }

    #[test]
    fn invalid_env_number_is_rejected() {
        let mut config = Config::default();
        let overrides = env(&[("INTAKE_MAX_MESSAGE_CHARS", "lots")]);
        let err = apply_env_overrides(&mut config, overrides).unwrap_err();
        assert!(err.to_string().contains("INTAKE_MAX_MESSAGE_CHARS"));
    }

    #[test]
    fn endpoint_without_staff_address_is_invalid() {
        let mut config = Config::default();
        config.notification.endpoint = Some("https://mail.example.com/send".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_notification_timeout_is_invalid() {
        let mut config = Config::default();
        config.notification.timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("notification.timeout_secs"));
    }

    #[test]
    fn default_body_limit_covers_worst_case_encoding() {
        let config = Config::default();
        assert!(config.server.max_body_bytes >= config.limits.max_encoded_bytes());
    }

    #[test]
    fn body_limit_below_encoded_bound_is_invalid() {
        let mut config = Config::default();
        config.server.max_body_bytes = 64 * 1024;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.max_body_bytes"));

        config.limits.max_message_chars = 4_000;
        config.validate().unwrap();
    }

    #[test]
    fn explicit_database_path_wins() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/tmp/x.db"));
        assert_eq!(config.database_path(), Some(PathBuf::from("/tmp/x.db")));
    }
}
