//! Configuration loaded from a TOML file.
//!
//! Every section and field has a default, so an empty file (or no file at
//! all) is a valid configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::increment::ConcurrencyMode;

/// Default config file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "sheet-kv.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server settings.
    pub server: ServerConfig,
    /// Which sheet to serve and how.
    pub sheet: SheetConfig,
    /// CORS settings.
    pub cors: CorsConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Server bind settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1" or "0.0.0.0").
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Store backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetBackend {
    /// Google Sheets v4 API with a service-account key.
    #[default]
    Google,
    /// Rows held in process memory, seeded from `rows`.
    Memory,
}

/// Sheet settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub backend: SheetBackend,
    /// Spreadsheet document ID (google backend).
    pub spreadsheet_id: Option<String>,
    /// Name of the sheet (tab) holding the data.
    pub sheet_name: String,
    /// Path to the service-account JSON key (google backend).
    pub credentials: PathBuf,
    /// Handling of concurrent increments for one ID.
    pub concurrency: ConcurrencyMode,
    /// Initial contents for the memory backend, header row first.
    pub rows: Vec<Vec<String>>,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            backend: SheetBackend::default(),
            spreadsheet_id: None,
            sheet_name: "data".to_string(),
            credentials: PathBuf::from("credentials.json"),
            concurrency: ConcurrencyMode::default(),
            rows: Vec::new(),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// When false, cross-origin requests are denied.
    pub enabled: bool,
    /// Allowed origins; `"*"` allows any.
    pub allow_origins: Vec<String>,
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,
    pub allow_credentials: bool,
    /// Preflight cache duration in seconds.
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allow_origins: vec!["*".to_string()],
            allow_methods: ["GET", "POST", "OPTIONS"].map(String::from).to_vec(),
            allow_headers: vec!["content-type".to_string()],
            allow_credentials: false,
            max_age: 3600,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "sheet_kv=debug,tower_http=info".
    pub level: String,
    pub format: LogFormat,
    /// "stdout", "stderr", or a file path to append to.
    pub output: String,
    /// ANSI colors (text format on a terminal only).
    pub color: bool,
    /// Include the event target.
    pub target: bool,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            output: "stderr".to_string(),
            color: true,
            target: true,
            timestamps: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.display().to_string(), e))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Load `path` when given, otherwise the default file if it exists,
    /// otherwise built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line or environment overrides.
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(bind) = overrides.bind {
            self.server.bind = bind;
        }
        if let Some(id) = overrides.spreadsheet_id {
            self.sheet.spreadsheet_id = Some(id);
        }
        if let Some(credentials) = overrides.credentials {
            self.sheet.credentials = credentials;
        }
        if let Some(concurrency) = overrides.concurrency {
            self.sheet.concurrency = concurrency;
        }
    }

    /// Get the socket address string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}

/// Values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub port: Option<u16>,
    pub bind: Option<String>,
    pub spreadsheet_id: Option<String>,
    pub credentials: Option<PathBuf>,
    pub concurrency: Option<ConcurrencyMode>,
}

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file '{0}': {1}")]
    Io(String, std::io::Error),
    /// TOML parse error.
    #[error("Failed to parse config: {0}")]
    Parse(toml::de::Error),
}
