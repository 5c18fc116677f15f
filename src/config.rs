//! Configuration management for the Gridwalk server
//!
//! Loads `config.toml` with environment overrides and projects the
//! registry-facing subset out of the full server configuration.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::registry::RegistryConfig;

/// Complete server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address to bind the HTTP listener
    pub bind_address: String,

    /// Port for the HTTP listener
    pub port: u16,

    /// Largest accepted HTTP request (headers + body), in bytes
    pub max_request_length: usize,

    /// Playing field width in tiles
    pub grid_width: i32,

    /// Playing field height in tiles
    pub grid_height: i32,

    /// Number of sprite images avatars are drawn from
    pub sprite_count: u32,

    /// Avatars unseen for longer than this are hidden from list output
    pub liveness_window_ms: u64,

    /// How long a spoken message stays visible
    pub chat_duration_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8081,
            max_request_length: 65_536,
            grid_width: 16,
            grid_height: 12,
            sprite_count: 43,
            liveness_window_ms: 30_000,
            chat_duration_ms: 5_000,
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        // Try production path first, then development path
        let config_paths = [
            "gridwalk-server/config", // Docker production
            "config",                 // Local development: ./config.toml
        ];

        let mut last_error = None;

        for config_path in &config_paths {
            match Config::builder()
                .add_source(File::with_name(config_path))
                .add_source(Environment::with_prefix("GRIDWALK"))
                .build()
            {
                Ok(settings) => {
                    let config: ServerConfig = settings.try_deserialize()?;
                    config.validate()?;
                    return Ok(config);
                }
                Err(e) => {
                    last_error = Some(e);
                    continue;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ConfigError::Message(format!("no config file found, tried {config_paths:?}"))
        }))
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width < 1 || self.grid_height < 1 {
            return Err(ConfigError::Message(
                "grid dimensions must be at least 1x1".into(),
            ));
        }

        if self.sprite_count == 0 {
            return Err(ConfigError::Message(
                "sprite_count must be greater than 0".into(),
            ));
        }

        if self.liveness_window_ms == 0 || self.chat_duration_ms == 0 {
            return Err(ConfigError::Message(
                "liveness_window_ms and chat_duration_ms must be greater than 0".into(),
            ));
        }

        if self.max_request_length < 1024 {
            return Err(ConfigError::Message(
                "max_request_length must be at least 1024 bytes".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as a socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// The registry-facing subset of the configuration.
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            max_x: self.grid_width,
            max_y: self.grid_height,
            sprite_count: self.sprite_count,
            liveness_window_ms: self.liveness_window_ms,
            chat_duration_ms: self.chat_duration_ms,
        }
    }
}
