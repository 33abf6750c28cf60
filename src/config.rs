//! Configuration management for Dashlink
//!
//! This module defines the main `Config` struct and its sub-structs,
//! responsible for holding all application settings. It uses the `figment`
//! crate to load configuration from a `dashlink.toml` file and merge it with
//! environment variables and command-line arguments.
//!
//! Ports and the subscriber identity are explicit configuration rather than
//! ambient globals; channel setup receives them at initialization.

use crate::channel::ReconnectPolicy;
use crate::cli::Cli;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// The subscriber identity for the notification channel. Absent or
    /// too-short identities disable that channel; the metrics channel is
    /// identity-independent.
    #[serde(default)]
    pub identity: Option<String>,
    /// Configuration for the two subscription channels.
    pub channels: ChannelsConfig,
}

/// Configuration for the two subscription channels.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChannelsConfig {
    /// Host serving both WebSocket endpoints.
    pub host: String,
    /// Fixed port of the notification endpoint.
    pub notify_port: u16,
    /// Fixed port of the metrics endpoint.
    pub metrics_port: u16,
    /// Whether to accept invalid TLS certificates (for testing).
    pub allow_invalid_certs: bool,
    /// Reconnection behavior after a closed connection.
    pub reconnect: ReconnectConfig,
}

/// Reconnection settings.
///
/// Disabled by default: a closed channel then stays closed until restart,
/// which matches the original page-lifetime behavior.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReconnectConfig {
    /// Enable reconnection with exponential backoff.
    pub enabled: bool,
    /// First backoff delay in milliseconds.
    pub initial_backoff_ms: u64,
    /// Backoff ceiling in milliseconds.
    pub max_backoff_ms: u64,
}

impl ReconnectConfig {
    /// Translates the settings into a channel policy.
    pub fn policy(&self) -> ReconnectPolicy {
        if self.enabled {
            ReconnectPolicy::Backoff {
                initial: Duration::from_millis(self.initial_backoff_ms),
                max: Duration::from_millis(self.max_backoff_ms),
            }
        } else {
            ReconnectPolicy::Never
        }
    }
}

impl Config {
    /// Loads the application configuration by layering sources: defaults,
    /// the TOML file, `DASHLINK_`-prefixed environment variables, and
    /// command-line arguments.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| "dashlink.toml".into());

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            // Allow overriding with environment variables, e.g., DASHLINK_LOG_LEVEL=debug
            .merge(Env::prefixed("DASHLINK_"))
            .merge(cli.clone())
            .extract()?;
        Ok(config)
    }
}

// Provide a default implementation for tests and easy setup.
impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            identity: None,
            channels: ChannelsConfig {
                host: "localhost".to_string(),
                notify_port: 8765,
                metrics_port: 8766,
                allow_invalid_certs: false,
                reconnect: ReconnectConfig {
                    enabled: false,
                    initial_backoff_ms: 1000,
                    max_backoff_ms: 60_000,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_reconnect_policy_is_never() {
        let config = Config::default();
        assert!(matches!(
            config.channels.reconnect.policy(),
            ReconnectPolicy::Never
        ));
    }

    #[test]
    fn enabled_reconnect_maps_to_backoff() {
        let reconnect = ReconnectConfig {
            enabled: true,
            initial_backoff_ms: 250,
            max_backoff_ms: 4000,
        };
        match reconnect.policy() {
            ReconnectPolicy::Backoff { initial, max } => {
                assert_eq!(initial, Duration::from_millis(250));
                assert_eq!(max, Duration::from_millis(4000));
            }
            ReconnectPolicy::Never => panic!("expected backoff policy"),
        }
    }
}
