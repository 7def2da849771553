use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as URL: {source}")]
    ParseUrl {
        name: String,
        #[source]
        source: url::ParseError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub bot_token: String,
    pub telegram_api_url: Option<Url>,
    pub upload_timeout: Duration,

    // TeraBox
    pub terabox_base_url: Url,
    pub http_timeout: Duration,

    // Downloads
    pub work_dir: PathBuf,
    pub download_stall_timeout: Duration,
    pub progress_step_percent: u8,
    pub max_file_size: Option<u64>,

    // Keep-alive
    pub health_port: Option<u16>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Telegram
            bot_token: required_env("BOT_TOKEN")?,
            telegram_api_url: optional_env("TELEGRAM_API_URL")
                .map(|v| parse_url("TELEGRAM_API_URL", &v))
                .transpose()?,
            upload_timeout: Duration::from_secs(parse_env_u64("UPLOAD_TIMEOUT_SECS", 600)?),

            // TeraBox
            terabox_base_url: parse_url(
                "TERABOX_BASE_URL",
                &env_or_default("TERABOX_BASE_URL", "https://www.terabox.com"),
            )?,
            http_timeout: Duration::from_secs(parse_env_u64("HTTP_TIMEOUT_SECS", 30)?),

            // Downloads
            work_dir: PathBuf::from(env_or_default("WORK_DIR", "./data/tmp")),
            download_stall_timeout: Duration::from_secs(parse_env_u64(
                "DOWNLOAD_STALL_TIMEOUT_SECS",
                60,
            )?),
            progress_step_percent: parse_env_u8("PROGRESS_STEP_PERCENT", 5)?,
            max_file_size: parse_optional_u64("MAX_FILE_SIZE_MB")?
                .map(|mb| {
                    mb.checked_mul(1024 * 1024)
                        .ok_or_else(|| ConfigError::InvalidValue {
                            name: "MAX_FILE_SIZE_MB".to_string(),
                            message: format!("{mb} MB does not fit in a byte count"),
                        })
                })
                .transpose()?,

            // Keep-alive
            health_port: parse_optional_u16("HEALTH_PORT")?,
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot_token.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "BOT_TOKEN".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.progress_step_percent == 0 || self.progress_step_percent > 100 {
            return Err(ConfigError::InvalidValue {
                name: "PROGRESS_STEP_PERCENT".to_string(),
                message: "must be between 1 and 100".to_string(),
            });
        }
        if self.http_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "HTTP_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.upload_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "UPLOAD_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.download_stall_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "DOWNLOAD_STALL_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if !matches!(self.terabox_base_url.scheme(), "http" | "https")
            || self.terabox_base_url.host_str().is_none()
        {
            return Err(ConfigError::InvalidValue {
                name: "TERABOX_BASE_URL".to_string(),
                message: "must be an http(s) origin".to_string(),
            });
        }
        Ok(())
    }

    /// Configuration with sensible defaults for tests.
    ///
    /// # Panics
    ///
    /// Never in practice; the default base URL is a constant.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            bot_token: "test-token".to_string(),
            telegram_api_url: None,
            upload_timeout: Duration::from_secs(30),
            terabox_base_url: Url::parse("https://www.terabox.com").expect("valid constant URL"),
            http_timeout: Duration::from_secs(5),
            work_dir: std::env::temp_dir(),
            download_stall_timeout: Duration::from_secs(5),
            progress_step_percent: 5,
            max_file_size: None,
            health_port: None,
        }
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_url(name: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::ParseUrl {
        name: name.to_string(),
        source: e,
    })
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    Ok(parse_optional_u64(name)?.unwrap_or(default))
}

fn parse_optional_u64(name: &str) -> Result<Option<u64>, ConfigError> {
    optional_env(name)
        .map(|val| {
            val.parse().map_err(|e| ConfigError::ParseInt {
                name: name.to_string(),
                source: e,
            })
        })
        .transpose()
}

fn parse_optional_u16(name: &str) -> Result<Option<u16>, ConfigError> {
    optional_env(name)
        .map(|val| {
            val.parse().map_err(|e| ConfigError::ParseInt {
                name: name.to_string(),
                source: e,
            })
        })
        .transpose()
}

fn parse_env_u8(name: &str, default: u8) -> Result<u8, ConfigError> {
    match optional_env(name) {
        Some(val) => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        None => Ok(default),
    }
}
