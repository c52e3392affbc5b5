//! Configuration management for the ballot registry
//!
//! Loads configuration from environment variables (and a `.env` file when one
//! is present) with validation.

use crate::types::Identity;
use crate::{Result, config_error};
use serde::{Deserialize, Serialize};

/// Default label stamped on notification records
pub const DEFAULT_NOTIFICATION_SOURCE: &str = "ballot-registry";

/// Process environment lookup
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Identity recorded as owner at construction
    pub owner: Identity,
}

impl RegistryConfig {
    /// Load registry configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_vars(env_var)
    }

    /// Load registry configuration from an arbitrary variable lookup
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let owner = var("BALLOT_OWNER")
            .ok_or_else(|| config_error!("BALLOT_OWNER environment variable required"))?;

        Ok(Self {
            owner: Self::parse_owner(&owner)?,
        })
    }

    /// Create configuration for testing
    pub fn for_testing() -> Self {
        Self {
            owner: Identity::random(),
        }
    }

    fn parse_owner(value: &str) -> Result<Identity> {
        Identity::from_hex(value.trim())
            .map_err(|e| config_error!("BALLOT_OWNER must be a 64-char hex identity: {}", e))
    }
}

/// Notification log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Label written into every notification record
    pub source: String,
}

impl NotificationConfig {
    /// Load notification configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(env_var)
    }

    /// Load notification configuration from an arbitrary variable lookup
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let source = var("BALLOT_NOTIFICATION_SOURCE")
            .unwrap_or_else(|| DEFAULT_NOTIFICATION_SOURCE.to_string());

        if source.trim().is_empty() {
            return Err(config_error!("BALLOT_NOTIFICATION_SOURCE must not be empty"));
        }

        Ok(Self { source })
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_NOTIFICATION_SOURCE.to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    /// Load logging configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(env_var)
    }

    /// Load logging configuration from an arbitrary variable lookup
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let level = var("LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let format = var("LOG_FORMAT").unwrap_or_else(|| "json".to_string());

        Self::validate_format(&format)?;

        Ok(Self { level, format })
    }

    fn validate_format(format: &str) -> Result<()> {
        match format {
            "json" | "pretty" | "compact" => Ok(()),
            other => Err(config_error!(
                "LOG_FORMAT must be one of json, pretty, compact (got {})",
                other
            )),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub registry: RegistryConfig,
    pub notifications: NotificationConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_vars(env_var)
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let registry = RegistryConfig::from_vars(&var)?;
        let notifications = NotificationConfig::from_vars(&var)?;
        let logging = LoggingConfig::from_vars(&var)?;

        Ok(Self {
            registry,
            notifications,
            logging,
        })
    }

    /// Create configuration for testing
    pub fn for_testing() -> Self {
        Self {
            registry: RegistryConfig::for_testing(),
            notifications: NotificationConfig {
                source: "ballot-test".to_string(),
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
