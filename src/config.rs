//! Process configuration, read once from the environment at startup.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

use crate::network::auth::OperatorAuthConfig;
use crate::network::server::ServerConfig;
use crate::qr::QrConfig;
use crate::ticket::service::SecretsConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },
}

/// Read and parse an optional variable.
pub(crate) fn env_parse<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value }),
        Err(_) => Ok(None),
    }
}

impl ServerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host: IpAddr = env_parse("BIND_ADDR")?.unwrap_or_else(|| defaults.bind_addr.ip());
        let port: u16 = env_parse("PORT")?.unwrap_or_else(|| defaults.bind_addr.port());

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            max_connections: env_parse("MAX_CONNECTIONS")?.unwrap_or(defaults.max_connections),
            request_timeout: env_parse("REQUEST_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            idle_timeout: env_parse("IDLE_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.idle_timeout),
            version: defaults.version,
        })
    }
}

/// Everything the binary needs.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Transport settings.
    pub server: ServerConfig,
    /// Token and envelope secrets.
    pub secrets: SecretsConfig,
    /// QR image settings.
    pub qr: QrConfig,
    /// Operator token settings.
    pub operator: OperatorAuthConfig,
}

impl AppConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            secrets: SecretsConfig::from_env(),
            qr: QrConfig::from_env()?,
            operator: OperatorAuthConfig::from_env(),
        })
    }
}
