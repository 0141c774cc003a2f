//! Server configuration.
//!
//! Sources, highest priority first:
//! 1. Environment variables (`GATEWAY_*`)
//! 2. TOML file at `$GATEWAY_CONFIG`, or `gateway.toml` in the working directory
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gateway_infra::DEFAULT_FANOUT_LIMIT;

pub const ENV_PREFIX: &str = "GATEWAY_";
pub const CONFIG_PATH_ENV: &str = "GATEWAY_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "gateway.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    pub infrastructure_manager_address: String,
    pub unified_logging_address: String,
    /// Organization and user directory.
    pub system_model_address: String,
    pub fanout_limit: usize,
    pub default_timeout_secs: u64,
    /// Serve from in-memory downstream services (local development).
    pub in_memory: bool,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            infrastructure_manager_address: String::new(),
            unified_logging_address: String::new(),
            system_model_address: String::new(),
            fanout_limit: DEFAULT_FANOUT_LIMIT,
            default_timeout_secs: 60,
            in_memory: false,
            log_json: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment()
            .extract()
            .map_err(|e| ConfigError::Figment(Box::new(e)))
    }

    pub fn figment() -> Figment {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]))
    }

    /// Check the settings before any listener is opened.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port",
                reason: "must be a valid port number".to_string(),
            });
        }
        if self.fanout_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fanout_limit",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.default_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "default_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.in_memory {
            require_address("infrastructure_manager_address", &self.infrastructure_manager_address)?;
            require_address("unified_logging_address", &self.unified_logging_address)?;
            require_address("system_model_address", &self.system_model_address)?;
        }
        Ok(())
    }

    pub fn print(&self) {
        tracing::info!(port = self.port, "gateway configuration");
        if self.in_memory {
            tracing::info!("downstream services: in-memory");
        } else {
            tracing::info!(address = %self.infrastructure_manager_address, "infrastructure manager");
            tracing::info!(address = %self.unified_logging_address, "unified logging coordinator");
            tracing::info!(address = %self.system_model_address, "system model");
        }
        tracing::info!(
            fanout_limit = self.fanout_limit,
            default_timeout_secs = self.default_timeout_secs,
            "limits"
        );
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }
}

fn require_address(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "address must be set".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_without_sources() {
        Jail::expect_with(|_jail| {
            let config = Config::load().expect("config loads");
            assert_eq!(config, Config::default());
            assert_eq!(config.default_timeout(), Duration::from_secs(60));
            Ok(())
        });
    }

    #[test]
    fn env_overrides_toml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "gateway.toml",
                r#"
                    port = 9000
                    infrastructure_manager_address = "infra:8081"
                    unified_logging_address = "logging:8323"
                    system_model_address = "system-model:8800"
                    fanout_limit = 4
                "#,
            )?;
            jail.set_env("GATEWAY_PORT", "9100");

            let config = Config::load().expect("config loads");
            assert_eq!(config.port, 9100);
            assert_eq!(config.infrastructure_manager_address, "infra:8081");
            assert_eq!(config.fanout_limit, 4);
            assert!(config.validate().is_ok());
            Ok(())
        });
    }

    #[test]
    fn config_path_can_be_redirected() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "in_memory = true\nlog_json = false")?;
            jail.set_env(CONFIG_PATH_ENV, "custom.toml");

            let config = Config::load().expect("config loads");
            assert!(config.in_memory);
            assert!(!config.log_json);
            Ok(())
        });
    }

    #[test]
    fn missing_downstream_address_is_rejected() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { field: "infrastructure_manager_address", .. }
        ));
    }

    #[test]
    fn system_model_address_is_required() {
        let config = Config {
            infrastructure_manager_address: "infra:8081".to_string(),
            unified_logging_address: "logging:8323".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "system_model_address", .. })
        ));
    }

    #[test]
    fn in_memory_needs_no_addresses() {
        let config = Config {
            in_memory: true,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_limits_are_rejected() {
        let config = Config {
            in_memory: true,
            fanout_limit: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "fanout_limit", .. })
        ));

        let config = Config {
            in_memory: true,
            default_timeout_secs: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "default_timeout_secs", .. })
        ));
    }
}
