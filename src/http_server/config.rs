//! HTTP Server Configuration
//!
//! Bind address, data and public folders, CORS origins and upload limits.
//! Values come from defaults, then the environment, then CLI flags.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variables read by [`ServerConfig::from_env`]
pub const ENV_PORT: &str = "PORT";
pub const ENV_DATA_DIR: &str = "DATA_DIR";
pub const ENV_PUBLIC_DIR: &str = "PUBLIC_DIR";
pub const ENV_FE_DEV_URL: &str = "FE_DEV_URL";
pub const ENV_FE_PROD_URL: &str = "FE_PROD_URL";

/// Invalid configuration value
#[derive(Debug, Clone, Error)]
#[error("Invalid value for {name}: '{value}'")]
pub struct ConfigError {
    pub name: String,
    pub value: String,
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 3001)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding `books.json` and `users.json` (default: "./data")
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory served as static files (default: "./public")
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    /// CORS allowed origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Largest accepted single upload (default: 1 MiB)
    #[serde(default = "default_upload_limit")]
    pub upload_limit_bytes: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("./public")
}

fn default_upload_limit() -> u64 {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            public_dir: default_public_dir(),
            cors_origins: Vec::new(),
            upload_limit_bytes: default_upload_limit(),
        }
    }
}

impl ServerConfig {
    /// Create a new config with specified port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = lookup(ENV_PORT) {
            config.port = port.trim().parse().map_err(|_| ConfigError {
                name: ENV_PORT.to_string(),
                value: port.clone(),
            })?;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_PUBLIC_DIR) {
            config.public_dir = PathBuf::from(dir);
        }
        config.cors_origins = [ENV_FE_DEV_URL, ENV_FE_PROD_URL]
            .into_iter()
            .filter_map(&lookup)
            .filter(|origin| !origin.trim().is_empty())
            .collect();

        Ok(config)
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3001);
        assert_eq!(config.upload_limit_bytes, 1024 * 1024);
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig::with_port(8080);
        assert_eq!(config.socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_environment_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "4000"),
            ("DATA_DIR", "/srv/data"),
            ("FE_DEV_URL", "http://localhost:3000"),
            ("FE_PROD_URL", ""),
        ]))
        .unwrap();

        assert_eq!(config.port, 4000);
        assert_eq!(config.data_dir, PathBuf::from("/srv/data"));
        assert_eq!(config.public_dir, PathBuf::from("./public"));
        assert_eq!(config.cors_origins, vec!["http://localhost:3000".to_string()]);
    }

    #[test]
    fn test_invalid_port() {
        let err = ServerConfig::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert_eq!(err.name, "PORT");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ServerConfig = serde_json::from_str(r#"{"port": 9000}"#).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }
}
