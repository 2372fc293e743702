use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Files tried, in order, when `CONFIG_PATH` is not set.
const DEFAULT_CONFIG_FILES: [&str; 3] = ["config.toml", "config.yaml", "config.json"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub timeouts: TimeoutSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub limits: LimitSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5173
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

/// Connection details for the workflow provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub contract_api_key: String,
    #[serde(default)]
    pub translation_api_key: String,
    /// Value sent as `user` on every upload and workflow run.
    #[serde(default = "default_user_tag")]
    pub user_tag: String,
}

fn default_base_url() -> String {
    "http://localhost/v1".to_string()
}

fn default_user_tag() -> String {
    "ai-toolbox-user".to_string()
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            contract_api_key: String::new(),
            translation_api_key: String::new(),
            user_tag: default_user_tag(),
        }
    }
}

/// Per-attempt timeouts, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutSettings {
    #[serde(default = "default_upload_secs")]
    pub upload_secs: f64,
    #[serde(default = "default_contract_secs")]
    pub contract_secs: f64,
    #[serde(default = "default_translation_min_secs")]
    pub translation_min_secs: f64,
    #[serde(default = "default_translation_max_secs")]
    pub translation_max_secs: f64,
    /// Characters of source text granted one second of translation time.
    #[serde(default = "default_translation_chars_per_sec")]
    pub translation_chars_per_sec: f64,
    #[serde(default = "default_check_secs")]
    pub check_secs: f64,
}

fn default_upload_secs() -> f64 {
    30.0
}

fn default_contract_secs() -> f64 {
    120.0
}

fn default_translation_min_secs() -> f64 {
    30.0
}

fn default_translation_max_secs() -> f64 {
    120.0
}

fn default_translation_chars_per_sec() -> f64 {
    50.0
}

fn default_check_secs() -> f64 {
    10.0
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            upload_secs: default_upload_secs(),
            contract_secs: default_contract_secs(),
            translation_min_secs: default_translation_min_secs(),
            translation_max_secs: default_translation_max_secs(),
            translation_chars_per_sec: default_translation_chars_per_sec(),
            check_secs: default_check_secs(),
        }
    }
}

impl TimeoutSettings {
    pub fn upload(&self) -> Duration {
        Duration::from_secs_f64(self.upload_secs)
    }

    pub fn contract(&self) -> Duration {
        Duration::from_secs_f64(self.contract_secs)
    }

    pub fn check(&self) -> Duration {
        Duration::from_secs_f64(self.check_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts per workflow call, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_attempts() -> u32 {
    3
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitSettings {
    #[serde(default = "default_max_translation_chars")]
    pub max_translation_chars: usize,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_max_translation_chars() -> usize {
    5000
}

fn default_max_upload_bytes() -> usize {
    15 * 1024 * 1024
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_translation_chars: default_max_translation_chars(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Settings {
    /// Load settings from an optional file, `APP__*` variables and the
    /// provider's conventional variables (`DIFY_BASE_URL`, `HOST`, ...).
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CONFIG_PATH").ok().or_else(|| {
            DEFAULT_CONFIG_FILES
                .iter()
                .find(|candidate| Path::new(candidate).exists())
                .map(|candidate| candidate.to_string())
        });

        let mut builder = Config::builder();
        match &path {
            Some(path) => {
                info!("Loading configuration from: {}", path);
                builder = builder.add_source(File::with_name(path));
            }
            None => debug!("No configuration file found, using defaults and environment"),
        }

        let origins = std::env::var("ALLOWED_ORIGINS")
            .ok()
            .and_then(|raw| parse_origins(&raw));

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins"),
            )
            .set_override_option("provider.base_url", std::env::var("DIFY_BASE_URL").ok())?
            .set_override_option(
                "provider.contract_api_key",
                std::env::var("DIFY_CONTRACT_API_KEY").ok(),
            )?
            .set_override_option(
                "provider.translation_api_key",
                std::env::var("DIFY_TRANSLATION_API_KEY").ok(),
            )?
            .set_override_option("server.host", std::env::var("HOST").ok())?
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .set_override_option("server.allowed_origins", origins)?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Message(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        let t = &self.timeouts;
        let all = [
            t.upload_secs,
            t.contract_secs,
            t.translation_min_secs,
            t.translation_max_secs,
            t.translation_chars_per_sec,
            t.check_secs,
        ];
        if all.iter().any(|secs| !secs.is_finite() || *secs <= 0.0) {
            return Err(ConfigError::Message(
                "timeouts must be positive numbers".to_string(),
            ));
        }
        if t.translation_min_secs > t.translation_max_secs {
            return Err(ConfigError::Message(format!(
                "timeouts.translation_min_secs ({}) exceeds timeouts.translation_max_secs ({})",
                t.translation_min_secs, t.translation_max_secs
            )));
        }
        Ok(())
    }

    /// `host:port` the server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Comma-separated origin list. A list with no usable entries counts as unset.
fn parse_origins(raw: &str) -> Option<Vec<String>> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect();
    if origins.is_empty() {
        warn!("ALLOWED_ORIGINS is set but lists no origins, keeping configured origins");
        return None;
    }
    Some(origins)
}
