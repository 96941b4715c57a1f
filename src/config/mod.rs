//! Configuration management.
//!
//! Configuration is read from `~/.config/faceverify/config.toml`:
//!
//! ```toml
//! api_url = "https://faces.example.com"
//! max_image_bytes = 10485760
//! history_limit = 50
//! token_path = "/home/alice/.local/share/faceverify/session.json"
//!
//! [http]
//! timeout_ms = 120000
//! connect_timeout_ms = 5000
//!
//! [logging]
//! format = "json"
//! file = "/tmp/faceverify.log"
//! ```
//!
//! Environment variables override file values (see [`ClientConfig::with_env_overrides`]).

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default backend base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default maximum size of a single uploaded image (10 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Default number of history records requested.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

/// Main configuration for the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the verification backend.
    pub api_url: String,
    /// HTTP timeouts.
    pub http: HttpConfig,
    /// Maximum accepted size of each image, in bytes.
    pub max_image_bytes: u64,
    /// Number of history records to request (`None` lets the backend decide).
    pub history_limit: Option<u32>,
    /// Where the session token is persisted.
    pub token_path: PathBuf,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// HTTP client configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpConfig {
    /// Request timeout in milliseconds (0 to disable).
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        // First-use model loading on the backend can take up to two minutes.
        Self {
            timeout_ms: 120_000,
            connect_timeout_ms: 5_000,
        }
    }
}

/// Logging settings from the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingSettings {
    /// Output format: `pretty` or `json`.
    pub format: Option<String>,
    /// Filter directive (same syntax as `RUST_LOG`).
    pub filter: Option<String>,
    /// Optional log file path.
    pub file: Option<PathBuf>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Backend base URL.
    pub api_url: Option<String>,
    /// Maximum image size.
    pub max_image_bytes: Option<u64>,
    /// History limit (0 means "backend default").
    pub history_limit: Option<u32>,
    /// Token file path.
    pub token_path: Option<PathBuf>,
    /// HTTP section.
    pub http: Option<ConfigFileHttp>,
    /// Logging section.
    pub logging: Option<LoggingSettings>,
}

/// HTTP section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileHttp {
    /// Request timeout.
    pub timeout_ms: Option<u64>,
    /// Connect timeout.
    pub connect_timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            http: HttpConfig::default(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            history_limit: Some(DEFAULT_HISTORY_LIMIT),
            token_path: default_token_path(),
            logging: LoggingSettings::default(),
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path, then applies env overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: format!("{}: {e}", path.display()),
            })?;

        let file: ConfigFile =
            toml::from_str(&contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;

        Ok(Self::from_config_file(file).with_env_overrides())
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the platform config dir, then `~/.config/faceverify/`, using
    /// the first file that exists. Returns defaults (with env overrides) if
    /// neither exists.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing config file cannot be read or parsed.
    pub fn load_default() -> crate::Result<Self> {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Ok(Self::default().with_env_overrides());
        };

        let candidates = [
            base_dirs.config_dir().join("faceverify").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("faceverify")
                .join("config.toml"),
        ];

        Self::load_first_existing(&candidates)
    }

    /// Loads the first existing path in `candidates`, or defaults if none
    /// exists.
    fn load_first_existing(candidates: &[PathBuf]) -> crate::Result<Self> {
        match candidates.iter().find(|p| p.exists()) {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default().with_env_overrides()),
        }
    }

    /// Converts a `ConfigFile` to `ClientConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(api_url) = file.api_url {
            config.api_url = api_url;
        }
        if let Some(max) = file.max_image_bytes {
            config.max_image_bytes = max;
        }
        if let Some(limit) = file.history_limit {
            config.history_limit = (limit > 0).then_some(limit);
        }
        if let Some(path) = file.token_path {
            config.token_path = path;
        }
        if let Some(http) = file.http {
            if let Some(v) = http.timeout_ms {
                config.http.timeout_ms = v;
            }
            if let Some(v) = http.connect_timeout_ms {
                config.http.connect_timeout_ms = v;
            }
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        config
    }

    /// Applies environment variable overrides.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `FACEVERIFY_API_URL` | `api_url` |
    /// | `FACEVERIFY_TIMEOUT_MS` | `http.timeout_ms` |
    /// | `FACEVERIFY_CONNECT_TIMEOUT_MS` | `http.connect_timeout_ms` |
    /// | `FACEVERIFY_TOKEN_PATH` | `token_path` |
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("FACEVERIFY_API_URL") {
            if !v.trim().is_empty() {
                self.api_url = v.trim().to_string();
            }
        }
        if let Ok(v) = std::env::var("FACEVERIFY_TIMEOUT_MS") {
            if let Ok(timeout_ms) = v.parse::<u64>() {
                self.http.timeout_ms = timeout_ms;
            }
        }
        if let Ok(v) = std::env::var("FACEVERIFY_CONNECT_TIMEOUT_MS") {
            if let Ok(connect_timeout_ms) = v.parse::<u64>() {
                self.http.connect_timeout_ms = connect_timeout_ms;
            }
        }
        if let Ok(v) = std::env::var("FACEVERIFY_TOKEN_PATH") {
            if !v.trim().is_empty() {
                self.token_path = PathBuf::from(v);
            }
        }
        self
    }

    /// Sets the backend base URL.
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Sets the token file path.
    #[must_use]
    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    /// Sets the HTTP timeouts.
    #[must_use]
    pub const fn with_http_config(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Sets the maximum accepted image size.
    #[must_use]
    pub const fn with_max_image_bytes(mut self, max: u64) -> Self {
        self.max_image_bytes = max;
        self
    }

    /// Sets the history limit.
    #[must_use]
    pub const fn with_history_limit(mut self, limit: Option<u32>) -> Self {
        self.history_limit = limit;
        self
    }
}

/// Returns the default session token path under the platform data dir.
fn default_token_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "faceverify").map_or_else(
        || PathBuf::from(".faceverify").join("session.json"),
        |dirs| dirs.data_dir().join("session.json"),
    )
}
