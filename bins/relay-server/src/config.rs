use std::path::Path;

use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

use relay_api_server::ApiLimits;
use relay_store::PACKET_CAPACITY;

use crate::error::ServerError;

#[derive(Parser)]
#[command(name = "relay-server", about = "Telemetry relay: packet ingestion over WebSocket, HTTP query API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the relay
    Serve(ServeArgs),
}

#[derive(Args, Clone, Debug)]
pub struct ServeArgs {
    /// Path to the TOML config file. Built-in defaults apply if it does not exist.
    #[arg(long, default_value = "relay.toml", env = "RELAY_CONFIG")]
    pub config: String,
}

// ---- TOML Config ----

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Packets retained in the ring.
    #[serde(default = "default_packet_capacity")]
    pub packet_capacity: usize,
    #[serde(default = "default_event_body_limit")]
    pub event_body_limit_bytes: usize,
    #[serde(default = "default_ws_max_message")]
    pub ws_max_message_bytes: usize,
    /// How long shutdown waits for the API server before aborting it.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,
}

fn default_listen_addr() -> String {
    "0.0.0.0".into()
}
fn default_api_port() -> u16 {
    8080
}
fn default_packet_capacity() -> usize {
    PACKET_CAPACITY
}
fn default_event_body_limit() -> usize {
    ApiLimits::default().event_body_bytes
}
fn default_ws_max_message() -> usize {
    ApiLimits::default().ws_message_bytes
}
fn default_shutdown_grace() -> u64 {
    5
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            api_port: default_api_port(),
            packet_capacity: default_packet_capacity(),
            event_body_limit_bytes: default_event_body_limit(),
            ws_max_message_bytes: default_ws_max_message(),
            shutdown_grace_secs: default_shutdown_grace(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &str) -> Result<Self, ServerError> {
        if !Path::new(path).exists() {
            tracing::info!(config = %path, "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config { context: "read", detail: format!("'{path}': {e}") })?;
        Self::parse(&content)
            .map_err(|detail| ServerError::Config { context: "parse", detail: format!("'{path}': {detail}") })
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        let config: Self = toml::from_str(content).map_err(|e| e.to_string())?;
        for (key, value) in [
            ("packet_capacity", config.packet_capacity),
            ("event_body_limit_bytes", config.event_body_limit_bytes),
            ("ws_max_message_bytes", config.ws_max_message_bytes),
        ] {
            if value == 0 {
                return Err(format!("{key} must be > 0"));
            }
        }
        Ok(config)
    }

    pub fn limits(&self) -> ApiLimits {
        ApiLimits {
            event_body_bytes: self.event_body_limit_bytes,
            ws_message_bytes: self.ws_max_message_bytes,
        }
    }
}
