//! Client configuration and per-call options.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PROTOCOL: &str = "http";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 5;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_TRUST_STORE: &str = "config/curl_cacert.pem";

/// Connection settings for one client instance.
///
/// Every field is optional when deserializing; missing fields fall back to
/// the defaults above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub use_ssl: bool,
    pub timeout_seconds: u64,
    /// Total number of attempts a retry-wrapped call may make.
    pub max_retries: u32,
    /// PEM bundle used to verify peers when `use_ssl` is set.
    pub trust_store: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            protocol: DEFAULT_PROTOCOL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            use_ssl: false,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            max_retries: DEFAULT_MAX_RETRIES,
            trust_store: PathBuf::from(DEFAULT_TRUST_STORE),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

impl ClientConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            ..Self::default()
        }
    }

    /// Read `{PREFIX}_HOST`, `{PREFIX}_PORT`, `{PREFIX}_PROTOCOL`,
    /// `{PREFIX}_USE_SSL`, `{PREFIX}_TIMEOUT_SECONDS`, `{PREFIX}_MAX_RETRIES`
    /// and `{PREFIX}_TRUST_STORE`, keeping defaults for unset variables.
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(prefix, |key| std::env::var(key).ok())
    }

    fn from_lookup(
        prefix: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            let key = format!("{prefix}_{name}");
            lookup(&key).map(|value| (key, value))
        };

        let mut config = Self::default();
        if let Some((_, v)) = get("PROTOCOL") {
            config.protocol = v;
        }
        if let Some((_, v)) = get("HOST") {
            config.host = v;
        }
        if let Some((k, v)) = get("PORT") {
            config.port = parse_value(k, v)?;
        }
        if let Some((k, v)) = get("USE_SSL") {
            config.use_ssl = parse_value(k, v)?;
        }
        if let Some((k, v)) = get("TIMEOUT_SECONDS") {
            config.timeout_seconds = parse_value(k, v)?;
        }
        if let Some((k, v)) = get("MAX_RETRIES") {
            config.max_retries = parse_value(k, v)?;
        }
        if let Some((_, v)) = get("TRUST_STORE") {
            config.trust_store = PathBuf::from(v);
        }
        Ok(config)
    }

    /// `https` whenever TLS is enabled, otherwise the configured protocol.
    pub fn scheme(&self) -> &str {
        if self.use_ssl {
            "https"
        } else {
            &self.protocol
        }
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme(), self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn parse_value<T: std::str::FromStr>(key: String, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}

/// Per-call flags accepted by every entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallOptions {
    /// Skip writing wire traffic to the debug sink.
    pub suppress_log: bool,
    /// Retry on timeout up to `max_retries` attempts.
    pub with_retry: bool,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            suppress_log: false,
            with_retry: true,
        }
    }
}

impl CallOptions {
    pub fn quiet() -> Self {
        Self {
            suppress_log: true,
            ..Self::default()
        }
    }

    pub fn single_attempt(self) -> Self {
        Self {
            with_retry: false,
            ..self
        }
    }
}
