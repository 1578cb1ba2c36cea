//! Configuration loading and settings resolution
//!
//! Bootstrap configuration comes from an optional TOML file. Each setting is
//! resolved independently in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file is not an error: the client warns and continues
//! with defaults. A config file that exists but does not parse is an error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the server base URL
pub const ENV_SERVER_URL: &str = "DATAGROOMER_SERVER_URL";

/// Environment variable overriding the initial upload session URL
pub const ENV_UPLOAD_URL: &str = "DATAGROOMER_UPLOAD_URL";

/// Environment variable overriding the log level
pub const ENV_LOG_LEVEL: &str = "DATAGROOMER_LOG_LEVEL";

/// Built-in defaults used when no other source provides a value
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub server_url: String,
    pub upload_url: String,
    pub log_level: String,
}

impl Default for CompiledDefaults {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".to_string(),
            upload_url: "/files/upload".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Base URL of the DataGroomer server (e.g. `http://localhost:8080`)
    #[serde(default)]
    pub server_url: Option<String>,

    /// Initial upload session URL, absolute or relative to `server_url`
    ///
    /// Only used for the first upload; the server hands out a fresh one
    /// with every upload response.
    #[serde(default)]
    pub upload_url: Option<String>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default)]
    pub level: Option<String>,
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load the config file if it exists, otherwise fall back to defaults
    ///
    /// `path` overrides the platform config location. Only a file that
    /// exists but cannot be read or parsed produces an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => {
                    warn!("Could not determine config directory, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        debug!(path = %path.display(), "Loading config file");
        Self::load(&path)
    }
}

/// Platform config file location (`<config dir>/datagroomer/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("datagroomer").join("config.toml"))
}

/// Resolved client settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub server_url: String,
    pub upload_url: String,
    pub log_level: String,
}

/// Resolves [`ClientSettings`] from all configuration sources
#[derive(Debug, Clone, Default)]
pub struct SettingsResolver {
    cli_server_url: Option<String>,
    cli_upload_url: Option<String>,
    toml: TomlConfig,
    defaults: CompiledDefaults,
}

impl SettingsResolver {
    /// Create a resolver over the given TOML config
    pub fn new(toml: TomlConfig) -> Self {
        Self {
            toml,
            ..Self::default()
        }
    }

    /// Server URL given on the command line
    pub fn with_cli_server_url(mut self, url: Option<String>) -> Self {
        self.cli_server_url = url;
        self
    }

    /// Upload URL given on the command line
    pub fn with_cli_upload_url(mut self, url: Option<String>) -> Self {
        self.cli_upload_url = url;
        self
    }

    /// Resolve and validate every setting
    pub fn resolve(&self) -> Result<ClientSettings> {
        let server_url = resolve_setting(
            self.cli_server_url.as_deref(),
            ENV_SERVER_URL,
            self.toml.server_url.as_deref(),
            &self.defaults.server_url,
        );
        let upload_url = resolve_setting(
            self.cli_upload_url.as_deref(),
            ENV_UPLOAD_URL,
            self.toml.upload_url.as_deref(),
            &self.defaults.upload_url,
        );
        let log_level = resolve_setting(
            None,
            ENV_LOG_LEVEL,
            self.toml.logging.level.as_deref(),
            &self.defaults.log_level,
        );

        if !(server_url.starts_with("http://") || server_url.starts_with("https://")) {
            return Err(Error::InvalidInput(format!(
                "server URL must start with http:// or https://, got {:?}",
                server_url
            )));
        }

        Ok(ClientSettings {
            server_url,
            upload_url,
            log_level,
        })
    }
}

/// Pick the first non-blank value: CLI → ENV → TOML → default
fn resolve_setting(cli: Option<&str>, env_var: &str, toml: Option<&str>, default: &str) -> String {
    if let Some(value) = cli.filter(|v| is_set(v)) {
        return value.to_string();
    }

    if let Ok(value) = std::env::var(env_var) {
        if is_set(&value) {
            return value;
        }
    }

    if let Some(value) = toml.filter(|v| is_set(v)) {
        return value.to_string();
    }

    default.to_string()
}

fn is_set(value: &str) -> bool {
    !value.trim().is_empty()
}
