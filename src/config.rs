// Configuration module
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub server: ServerSettings,
    pub upstream: UpstreamSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// 0 means one worker per CPU core.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

/// Upstream endpoints: the remote status API and the credential-validation
/// service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamSettings {
    /// Base URL of the status API, e.g. "https://data.example.org/status2".
    pub status_api_url: String,
    /// Credential-validation endpoint.
    pub identity_url: String,
    /// Hard bound on any upstream call; converts to a transport error.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Advisory: how long a query may run before a renderer should show a
    /// progress indicator.
    #[serde(default = "default_progress_after_ms")]
    pub progress_after_ms: u64,
    /// Summary page size, when capped.
    #[serde(default)]
    pub max_rows: Option<u32>,
}

/// Ticket and login settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Shared ticket secret, inline. Prefer `secret_file` outside dev.
    #[serde(default)]
    pub secret: Option<String>,
    /// File holding the shared ticket secret (shared with the front-end
    /// ticket checker).
    #[serde(default)]
    pub secret_file: Option<String>,
    /// Where a successful login lands when no back-URL was supplied.
    pub default_redirect: String,
    /// Usernames issued the administrator role slot.
    #[serde(default)]
    pub admin_users: Vec<String>,
    #[serde(default = "default_cookie_max_age_days")]
    pub cookie_max_age_days: i64,
    #[serde(default = "default_true")]
    pub cookie_secure: bool,
    /// Sign tickets with 0.0.0.0 instead of the client address. Needed
    /// behind proxies that do not forward the original IP.
    #[serde(default)]
    pub ignore_client_ip: bool,
}

impl AuthSettings {
    /// Resolve the shared secret, preferring the file over the inline
    /// value. Surrounding whitespace is trimmed, matching how the secret
    /// is quoted in front-end config files.
    pub fn secret_bytes(&self) -> anyhow::Result<Vec<u8>> {
        if let Some(path) = &self.secret_file {
            let raw = fs::read_to_string(path)?;
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                anyhow::bail!("secret file {} is empty", path);
            }
            return Ok(trimmed.as_bytes().to_vec());
        }
        match &self.secret {
            Some(secret) if !secret.is_empty() => Ok(secret.clone().into_bytes()),
            _ => anyhow::bail!("no ticket secret configured (set auth.secret or auth.secret_file)"),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_true")]
    pub log_to_console: bool,
    #[serde(default = "default_logs_path")]
    pub logs_path: String,
    /// Per-target level overrides, e.g. `jobdeck_client = "trace"`.
    #[serde(default)]
    pub targets: HashMap<String, String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_to_console: true,
            logs_path: default_logs_path(),
            targets: HashMap::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        let config: ServerConfig = toml::from_str(&raw)?;
        Ok(config)
    }
}

fn default_workers() -> usize {
    0
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_progress_after_ms() -> u64 {
    1500
}

fn default_cookie_max_age_days() -> i64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_logs_path() -> String {
    "./logs".to_string()
}
