//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `POLARITY_*` environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::analyzer::AnalyzerConfig;
use crate::constants::{
    DEFAULT_EXPLAIN_BATCH_SIZE, DEFAULT_MAX_TOKENS_PER_CHUNK, DEFAULT_MAX_UPLOAD_BYTES,
    DEFAULT_SESSION_CAPACITY, DEFAULT_SESSION_TTL_SECS, MODEL_MAX_SEQ_LEN,
};
use crate::model::ModelConfig;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `POLARITY_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Classifier location and loading options. No model path means stub mode.
    pub model: ModelConfig,

    /// Token window per chunk. Default: `450`, at most `512`.
    pub max_tokens_per_chunk: usize,

    /// Max retained upload sessions. Default: `10_000`.
    pub session_capacity: u64,

    /// Seconds an unused session survives. Default: `3600`.
    pub session_ttl_secs: u64,

    /// Occlusion variants per forward batch. Default: `16`.
    pub explain_batch_size: usize,

    /// Upload body limit in bytes. Default: 10 MiB.
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            model: ModelConfig::default(),
            max_tokens_per_chunk: DEFAULT_MAX_TOKENS_PER_CHUNK,
            session_capacity: DEFAULT_SESSION_CAPACITY,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            explain_batch_size: DEFAULT_EXPLAIN_BATCH_SIZE,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "POLARITY_PORT";
    const ENV_BIND_ADDR: &'static str = "POLARITY_BIND_ADDR";
    const ENV_MAX_TOKENS_PER_CHUNK: &'static str = "POLARITY_MAX_TOKENS_PER_CHUNK";
    const ENV_SESSION_CAPACITY: &'static str = "POLARITY_SESSION_CAPACITY";
    const ENV_SESSION_TTL_SECS: &'static str = "POLARITY_SESSION_TTL_SECS";
    const ENV_EXPLAIN_BATCH_SIZE: &'static str = "POLARITY_EXPLAIN_BATCH_SIZE";
    const ENV_MAX_UPLOAD_BYTES: &'static str = "POLARITY_MAX_UPLOAD_BYTES";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let model = ModelConfig::from_env();
        let max_tokens_per_chunk = Self::parse_number_from_env(
            Self::ENV_MAX_TOKENS_PER_CHUNK,
            defaults.max_tokens_per_chunk,
        )?;
        let session_capacity =
            Self::parse_number_from_env(Self::ENV_SESSION_CAPACITY, defaults.session_capacity)?;
        let session_ttl_secs =
            Self::parse_number_from_env(Self::ENV_SESSION_TTL_SECS, defaults.session_ttl_secs)?;
        let explain_batch_size = Self::parse_number_from_env(
            Self::ENV_EXPLAIN_BATCH_SIZE,
            defaults.explain_batch_size,
        )?;
        let max_upload_bytes =
            Self::parse_number_from_env(Self::ENV_MAX_UPLOAD_BYTES, defaults.max_upload_bytes)?;

        Ok(Self {
            port,
            bind_addr,
            model,
            max_tokens_per_chunk,
            session_capacity,
            session_ttl_secs,
            explain_batch_size,
            max_upload_bytes,
        })
    }

    /// Validates paths and basic invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref path) = self.model.model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        if !(1..=MODEL_MAX_SEQ_LEN).contains(&self.max_tokens_per_chunk) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_MAX_TOKENS_PER_CHUNK,
                value: self.max_tokens_per_chunk as u64,
                min: 1,
                max: MODEL_MAX_SEQ_LEN as u64,
            });
        }

        for (name, value) in [
            (Self::ENV_SESSION_CAPACITY, self.session_capacity),
            (Self::ENV_SESSION_TTL_SECS, self.session_ttl_secs),
            (Self::ENV_EXPLAIN_BATCH_SIZE, self.explain_batch_size as u64),
            (Self::ENV_MAX_UPLOAD_BYTES, self.max_upload_bytes as u64),
        ] {
            if value == 0 {
                return Err(ConfigError::MustBePositive { name });
            }
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            max_tokens_per_chunk: self.max_tokens_per_chunk,
            explain_batch_size: self.explain_batch_size,
        }
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_number_from_env<T>(name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr<Err = std::num::ParseIntError>,
    {
        match env::var(name) {
            Ok(value) if value.trim().is_empty() => Ok(default),
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e| ConfigError::InvalidNumber {
                    name,
                    value,
                    source: e,
                }),
            Err(_) => Ok(default),
        }
    }
}
