use std::path::PathBuf;
use std::time::Duration;

use ::config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub session_file: PathBuf,
    pub default_page_size: u32,
    pub max_file_size: u64,
    pub allowed_file_types: Vec<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingVariable(String),
    InvalidFormat(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVariable(var) => write!(f, "Missing configuration value: {}", var),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid format: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<::config::ConfigError> for ConfigError {
    fn from(err: ::config::ConfigError) -> Self {
        match err {
            ::config::ConfigError::NotFound(key) => ConfigError::MissingVariable(key),
            other => ConfigError::InvalidFormat(other.to_string()),
        }
    }
}

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const DEFAULT_ALLOWED_FILE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "application/pdf",
    "text/plain",
];

#[derive(Debug, Deserialize)]
struct RawConfig {
    api_base_url: String,
    request_timeout_secs: u64,
    session_file: String,
    default_page_size: u32,
    max_file_size: u64,
    allowed_file_types: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            session_file: default_session_file(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_file_types: DEFAULT_ALLOWED_FILE_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

fn default_session_file() -> PathBuf {
    PathBuf::from(".defect-control").join("session.json")
}

impl AppConfig {
    /// Defaults, then `defect-control.toml` if present, then
    /// `DEFECT_CONTROL_*` environment variables (a `.env` file is honoured).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::load(Some("defect-control"))
    }

    pub fn load(file: Option<&str>) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();

        let mut builder = Config::builder()
            .set_default("api_base_url", defaults.api_base_url.clone())?
            .set_default("request_timeout_secs", DEFAULT_TIMEOUT_SECS as i64)?
            .set_default(
                "session_file",
                defaults.session_file.to_string_lossy().to_string(),
            )?
            .set_default("default_page_size", DEFAULT_PAGE_SIZE as i64)?
            .set_default("max_file_size", DEFAULT_MAX_FILE_SIZE as i64)?
            .set_default("allowed_file_types", defaults.allowed_file_types.clone())?;

        if let Some(name) = file {
            builder = builder.add_source(File::with_name(name).required(false));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("DEFECT_CONTROL")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("allowed_file_types"),
            )
            .build()?;

        let raw: RawConfig = settings.try_deserialize()?;
        AppConfig::try_from(raw)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Absolute URL for an API path such as `/api/defects`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl TryFrom<RawConfig> for AppConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let api_base_url = raw.api_base_url.trim().to_string();
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidFormat(format!(
                "api_base_url must start with http:// or https:// (got '{}')",
                api_base_url
            )));
        }

        if raw.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidFormat(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        if raw.default_page_size == 0 {
            return Err(ConfigError::InvalidFormat(
                "default_page_size must be greater than zero".to_string(),
            ));
        }

        if raw.session_file.trim().is_empty() {
            return Err(ConfigError::MissingVariable("session_file".to_string()));
        }

        let allowed_file_types: Vec<String> = raw
            .allowed_file_types
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        for mime_type in &allowed_file_types {
            mime_type.parse::<mime::Mime>().map_err(|_| {
                ConfigError::InvalidFormat(format!("'{}' is not a valid MIME type", mime_type))
            })?;
        }

        Ok(AppConfig {
            api_base_url,
            request_timeout: Duration::from_secs(raw.request_timeout_secs),
            session_file: PathBuf::from(raw.session_file),
            default_page_size: raw.default_page_size,
            max_file_size: raw.max_file_size,
            allowed_file_types,
        })
    }
}
