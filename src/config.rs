//! Server configuration: schema, TOML loading, semantic validation.
//!
//! All fields have defaults so a minimal (or absent) config file works.
//! Serde handles the syntactic checks; `validate` covers the semantic ones.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Startup configuration for a [`crate::Server`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind, without the port.
    pub bind_address: String,
    /// TCP port to listen on. 0 asks the OS for an ephemeral port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "0.0.0.0".to_string(), port: 8080 }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Load and validate a configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: ServerConfig = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.bind_address.parse::<std::net::IpAddr>().is_err() {
        return Err(ConfigError::Invalid(format!(
            "bind_address is not an IP address: {:?}",
            config.bind_address
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config: ServerConfig = toml::from_str("port = 9000").unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.bind_address, "0.0.0.0");
    }

    #[test]
    fn invalid_bind_address_rejected() {
        let config = ServerConfig { bind_address: "not-an-ip".to_string(), port: 8080 };
        assert!(matches!(validate(&config), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn valid_config_passes() {
        assert!(validate(&ServerConfig::default()).is_ok());
    }
}
