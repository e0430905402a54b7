use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::transport::TlsPaths;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deployment {
    Local,
    Dev,
    Stage,
    Prod,
}

impl Deployment {
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Self::Dev,
            "stage" | "staging" => Self::Stage,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,
    pub db_timeout_seconds: u64,

    // HTTP API
    pub api_host: String,
    pub api_port: u16,

    // gRPC transport
    pub grpc_port: Option<u16>,
    pub grpc_tls: TlsPaths,

    // Logging
    pub log_format: LogFormat,

    // Application metadata
    pub deployment: Deployment,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if required environment variables are not set,
    /// and `ConfigError::Invalid` if `GRPC_PORT` is set but is not a port number
    /// or `DB_TIMEOUT_SECONDS` is not a positive whole number.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let grpc_port = match optional_var("GRPC_PORT") {
            Some(port) => Some(
                port.parse()
                    .map_err(|_| ConfigError::Invalid("GRPC_PORT", port))?,
            ),
            None => None,
        };

        Ok(Self {
            // Database
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            db_timeout_seconds: parse_timeout_seconds(optional_var("DB_TIMEOUT_SECONDS"))?,

            // HTTP API
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: env::var("API_PORT")
                .unwrap_or_else(|_| "4020".to_string())
                .parse()
                .unwrap_or(4020),

            // gRPC transport
            grpc_port,
            grpc_tls: TlsPaths {
                ca_file: optional_var("GRPC_CA_FILE").map(PathBuf::from),
                cert_file: optional_var("GRPC_CERT_FILE").map(PathBuf::from),
                key_file: optional_var("GRPC_KEY_FILE").map(PathBuf::from),
            },

            // Logging
            log_format: LogFormat::from_str(
                &env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
            ),

            // Application metadata
            deployment: Deployment::from_str(
                &env::var("DEPLOYMENT").unwrap_or_else(|_| "local".to_string()),
            ),
        })
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }

    #[must_use]
    pub fn grpc_bind_address(&self) -> Option<String> {
        self.grpc_port.map(|port| format!("{}:{port}", self.api_host))
    }

    /// Deadline applied to every store operation issued by the HTTP handlers.
    #[must_use]
    pub fn db_timeout(&self) -> Duration {
        Duration::from_secs(self.db_timeout_seconds)
    }
}

const DEFAULT_DB_TIMEOUT_SECONDS: u64 = 10;

/// Parse `DB_TIMEOUT_SECONDS`. Absent means the default; the value must be
/// a positive whole number.
///
/// # Errors
///
/// Returns `ConfigError::Invalid` for zero or a non-numeric value.
pub fn parse_timeout_seconds(raw: Option<String>) -> Result<u64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_DB_TIMEOUT_SECONDS);
    };
    match raw.trim().parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(seconds),
        _ => Err(ConfigError::Invalid("DB_TIMEOUT_SECONDS", raw)),
    }
}

/// Unset and empty variables are both treated as absent.
fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
