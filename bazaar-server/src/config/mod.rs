//! Configuration module for bazaar-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables.

pub mod file;

use crate::config::file::{FileConfig, StoreBackend};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub listen: SocketAddr,
    pub backend: StoreBackend,
    pub max_connections: u32,
    pub broadcast_capacity: usize,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file, or fall back to defaults when it does not exist
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let mut file_config = if self.config_path.exists() {
            let config_content = std::fs::read_to_string(&self.config_path)?;
            toml::from_str(&config_content)?
        } else {
            tracing::info!(
                path = %self.config_path.display(),
                "Config file not found, using defaults"
            );
            FileConfig::default()
        };

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        Self::validate(&file_config)?;

        Ok(LoadedConfig {
            listen: file_config.server.listen,
            backend: file_config.store.backend,
            max_connections: file_config.store.max_connections,
            broadcast_capacity: file_config.delivery.broadcast_capacity,
        })
    }

    fn validate(config: &FileConfig) -> Result<(), ConfigError> {
        if config.delivery.broadcast_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "delivery.broadcast_capacity must be at least 1".to_string(),
            ));
        }
        if config.store.backend == StoreBackend::Postgres && config.store.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "store.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}
