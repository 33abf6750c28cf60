//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the application using
//! the `clap` crate. These arguments are parsed at startup and then merged
//! with the configuration from the `dashlink.toml` file and environment
//! variables.

use clap::Parser;
use figment::{
    value::{Dict, Map, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Client-side push delivery for dashboard notifications and live counters.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Dashboard host serving both channel endpoints.
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Subscriber identity for the notification channel.
    #[arg(long, value_name = "NAME")]
    pub identity: Option<String>,

    /// Port of the notification endpoint.
    #[arg(long, value_name = "PORT")]
    pub notify_port: Option<u16>,

    /// Port of the metrics endpoint.
    #[arg(long, value_name = "PORT")]
    pub metrics_port: Option<u16>,

    /// Reconnect with exponential backoff after a closed connection.
    #[arg(long)]
    pub reconnect: bool,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(identity) = &self.identity {
            dict.insert("identity".into(), Value::from(identity.clone()));
        }

        let mut channels = Dict::new();
        if let Some(host) = &self.host {
            channels.insert("host".into(), Value::from(host.clone()));
        }
        if let Some(port) = self.notify_port {
            channels.insert("notify_port".into(), Value::from(u64::from(port)));
        }
        if let Some(port) = self.metrics_port {
            channels.insert("metrics_port".into(), Value::from(u64::from(port)));
        }
        if self.reconnect {
            let mut reconnect = Dict::new();
            reconnect.insert("enabled".into(), Value::from(true));
            channels.insert("reconnect".into(), Value::from(reconnect));
        }
        if !channels.is_empty() {
            dict.insert("channels".into(), Value::from(channels));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
