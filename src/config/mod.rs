//! Configuration management.
//!
//! Settings come from, in increasing priority:
//!
//! 1. built-in defaults,
//! 2. a TOML file (`--config`, `./litreview.toml`, or the user config directory),
//! 3. `LITREVIEW_*` environment variables,
//! 4. command line flags.
//!
//! # Configuration File Format
//!
//! ```toml
//! [backend]
//! base_url = "http://localhost:5000"
//! timeout_seconds = 300
//! user_agent = "litreview/0.1"
//!
//! [output]
//! directory = "./review"
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```
//!
//! Nested keys map to environment variables with `__`, e.g.
//! `LITREVIEW_BACKEND__BASE_URL`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backend::DEFAULT_BACKEND_URL;
use crate::utils::validate_url;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "LITREVIEW";

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "litreview.toml";

/// Environment variables recognized by [`load_config`]
pub const ENV_VARS: &[(&str, &str)] = &[
    ("LITREVIEW_BACKEND__BASE_URL", "Backend base URL"),
    ("LITREVIEW_BACKEND__TIMEOUT_SECONDS", "Request timeout in seconds (unset: none)"),
    ("LITREVIEW_BACKEND__USER_AGENT", "User agent sent to the backend"),
    ("LITREVIEW_OUTPUT__DIRECTORY", "Directory for papers.zip and research-results.json"),
    ("LITREVIEW_LOGGING__LEVEL", "Default log level (error, warn, info, debug, trace)"),
    ("LITREVIEW_LOGGING__FORMAT", "Log format (text or json)"),
    ("RUST_LOG", "Full tracing filter, overrides the log level"),
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid backend URL: {0}")]
    InvalidBackendUrl(String),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where and how to reach the review backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Unset means requests may take as long as the backend needs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: None,
            user_agent: None,
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

fn default_base_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Apply command line overrides on top of loaded settings
    pub fn apply_overrides(
        &mut self,
        backend_url: Option<String>,
        timeout_seconds: Option<u64>,
        output_dir: Option<PathBuf>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = backend_url {
            self.backend.base_url = url;
        }
        if timeout_seconds.is_some() {
            self.backend.timeout_seconds = timeout_seconds;
        }
        if let Some(dir) = output_dir {
            self.output.directory = dir;
        }
        self.validate()
    }

    /// Check the backend URL and normalize it
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.backend.base_url = validate_url(&self.backend.base_url)
            .map_err(|e| ConfigError::InvalidBackendUrl(e.to_string()))?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write this configuration as TOML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}

/// `<config dir>/litreview/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("litreview").join("config.toml"))
}

/// First existing config file among `./litreview.toml` and the user config path
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    default_config_path().filter(|path| path.is_file())
}

/// Load configuration from `path` (or the discovered file) plus the environment
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    load_config_with_env(path, None)
}

/// Like [`load_config`], with an explicit environment map in place of the process environment
pub fn load_config_with_env(
    path: Option<&Path>,
    env: Option<config::Map<String, String>>,
) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    match path {
        Some(path) => {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        None => {
            if let Some(found) = find_config_file() {
                tracing::debug!(path = %found.display(), "Using config file");
                builder = builder.add_source(config::File::from(found.as_path()).required(false));
            }
        }
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        )
        .build()?;

    let mut config: Config = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
