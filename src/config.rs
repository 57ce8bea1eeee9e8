use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub mongodb_collection: String,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub ping_interval_seconds: u64,
    pub reconnect_initial_seconds: u64,
    pub reconnect_max_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            // No default connection string; the deployment must supply one.
            mongodb_uri: String::new(),
            mongodb_database: "parklog".to_string(),
            mongodb_collection: "parking_events".to_string(),
            max_body_bytes: 64 * 1024,
            request_timeout_seconds: 15,
            ping_interval_seconds: 15,
            reconnect_initial_seconds: 1,
            reconnect_max_seconds: 60,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("PARKLOG_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        let file_path = Path::new(&path);
        if !file_path.exists() {
            warn!("config.toml not found, using defaults");
            let mut config = AppConfig::default();
            config.apply_env_overrides();
            config.normalize();
            config.validate()?;
            return Ok(config);
        }
        let content = fs::read_to_string(file_path).await?;
        let mut config: AppConfig = toml::from_str(&content)?;
        config.apply_env_overrides();
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        self.bind_addr = self.bind_addr.trim().to_string();
        self.mongodb_uri = self.mongodb_uri.trim().to_string();
        self.mongodb_database = self.mongodb_database.trim().to_string();
        self.mongodb_collection = self.mongodb_collection.trim().to_string();
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.mongodb_uri.is_empty() {
            return Err(anyhow!(
                "mongodb_uri is not set; provide it in config.toml or PARKLOG_MONGODB_URI"
            ));
        }
        if self.mongodb_database.is_empty() {
            return Err(anyhow!("mongodb_database must not be empty"));
        }
        if self.mongodb_collection.is_empty() {
            return Err(anyhow!("mongodb_collection must not be empty"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than 0"));
        }
        if self.ping_interval_seconds == 0 {
            return Err(anyhow!("ping_interval_seconds must be greater than 0"));
        }
        if self.reconnect_initial_seconds == 0 {
            return Err(anyhow!("reconnect_initial_seconds must be greater than 0"));
        }
        if self.reconnect_max_seconds < self.reconnect_initial_seconds {
            return Err(anyhow!(
                "reconnect_max_seconds must be >= reconnect_initial_seconds"
            ));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("PARKLOG_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("PARKLOG_MONGODB_URI") {
            self.mongodb_uri = value;
        }
        if let Ok(value) = env::var("PARKLOG_MONGODB_DATABASE") {
            self.mongodb_database = value;
        }
        if let Ok(value) = env::var("PARKLOG_MONGODB_COLLECTION") {
            self.mongodb_collection = value;
        }
        if let Ok(value) = env::var("PARKLOG_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("PARKLOG_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Ok(value) = env::var("PARKLOG_PING_INTERVAL_SECONDS") {
            self.ping_interval_seconds = value.parse().unwrap_or(self.ping_interval_seconds);
        }
        if let Ok(value) = env::var("PARKLOG_RECONNECT_INITIAL_SECONDS") {
            self.reconnect_initial_seconds =
                value.parse().unwrap_or(self.reconnect_initial_seconds);
        }
        if let Ok(value) = env::var("PARKLOG_RECONNECT_MAX_SECONDS") {
            self.reconnect_max_seconds = value.parse().unwrap_or(self.reconnect_max_seconds);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_uri() -> AppConfig {
        AppConfig {
            mongodb_uri: "mongodb://127.0.0.1:27017".to_string(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn defaults_fail_without_connection_string() {
        let config = AppConfig::default();
        let err = config.validate().expect_err("require mongodb_uri");
        assert!(err.to_string().contains("mongodb_uri"));
    }

    #[test]
    fn defaults_with_connection_string_validate() {
        config_with_uri().validate().expect("valid config");
    }

    #[test]
    fn invalid_bind_addr_is_rejected() {
        let mut config = config_with_uri();
        config.bind_addr = "not-an-address".to_string();
        let err = config.validate().expect_err("reject bind_addr");
        assert!(err.to_string().contains("bind_addr"));
    }

    #[test]
    fn normalize_trims_whitespace() {
        let mut config = AppConfig {
            mongodb_uri: "  mongodb://127.0.0.1:27017  ".to_string(),
            mongodb_collection: " parking_events ".to_string(),
            ..AppConfig::default()
        };
        config.normalize();
        assert_eq!(config.mongodb_uri, "mongodb://127.0.0.1:27017");
        assert_eq!(config.mongodb_collection, "parking_events");
    }

    #[test]
    fn backoff_bounds_must_be_ordered() {
        let mut config = config_with_uri();
        config.reconnect_initial_seconds = 30;
        config.reconnect_max_seconds = 5;
        let err = config.validate().expect_err("reject inverted backoff bounds");
        assert!(err.to_string().contains("reconnect_max_seconds"));
    }
}
