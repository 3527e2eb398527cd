use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid PORT value '{0}'")]
    InvalidPort(String),
    #[error("invalid HOST value '{0}'")]
    InvalidHost(String),
}

/// Where the HTTP server listens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Read `PORT` and `HOST` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match value("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => DEFAULT_PORT,
        };
        let host = match value("HOST") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidHost(raw.clone()))?,
            None => DEFAULT_HOST,
        };
        Ok(ServerConfig { host, port })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[])).expect("defaults");
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8000");
    }

    #[test]
    fn reads_port_and_host() {
        let config = ServerConfig::from_lookup(lookup(&[("PORT", "9100"), ("HOST", "127.0.0.1")]))
            .expect("valid");
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9100");
    }

    #[test]
    fn rejects_bad_port() {
        let err = ServerConfig::from_lookup(lookup(&[("PORT", "eighty")])).expect_err("invalid");
        assert_eq!(err, ConfigError::InvalidPort("eighty".to_string()));
        assert_eq!(err.to_string(), "invalid PORT value 'eighty'");
    }
}
