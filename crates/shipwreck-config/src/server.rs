use std::net::SocketAddr;

use crate::ConfigError;

/// Listen addresses for the HTTP API and the Prometheus scrape endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub metrics_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            metrics_port: 9090,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(crate::env_lookup)
    }

    #[must_use]
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            host: lookup("SERVER_HOST")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.host),
            port: crate::parse_or(&lookup, "SERVER_PORT", defaults.port),
            metrics_port: crate::parse_or(&lookup, "METRICS_PORT", defaults.metrics_port),
        }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `SERVER_HOST` is not an IP address.
    pub fn api_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.addr(self.port)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `SERVER_HOST` is not an IP address.
    pub fn metrics_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.addr(self.metrics_port)
    }

    fn addr(&self, port: u16) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                key: "SERVER_HOST",
                reason: e.to_string(),
            })
    }
}
