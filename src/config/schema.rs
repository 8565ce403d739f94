//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the realm server.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the realm server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RealmConfig {
    /// Listener configuration (bind address, session limits).
    pub listener: ListenerConfig,

    /// Realm identity and announcement settings.
    pub realm: RealmSettings,

    /// Shutdown countdown cadence and grace delay.
    pub shutdown: ShutdownConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Operator API settings.
    pub admin: AdminConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:24000").
    pub bind_address: String,

    /// Maximum concurrent sessions. Further connections are refused.
    pub max_sessions: usize,

    /// Capacity of each session's outbound message queue.
    pub outbound_buffer: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:24000".to_string(),
            max_sessions: 5_000,
            outbound_buffer: 64,
        }
    }
}

/// Realm identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RealmSettings {
    /// Display name of the realm.
    pub name: String,

    /// Message of the day announced to sessions when they connect.
    pub motd: String,
}

impl Default for RealmSettings {
    fn default() -> Self {
        Self {
            name: "Realm".to_string(),
            motd: String::new(),
        }
    }
}

/// Shutdown countdown timings, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Delay before the first countdown tick.
    pub initial_tick_secs: u64,

    /// Tick interval while more than a minute remains.
    pub coarse_tick_secs: u64,

    /// Tick interval inside the final minute.
    pub fine_tick_secs: u64,

    /// Delay between the disconnect pass and process exit.
    pub grace_secs: u64,
}

impl ShutdownConfig {
    pub fn initial_tick(&self) -> Duration {
        Duration::from_secs(self.initial_tick_secs)
    }

    pub fn coarse_tick(&self) -> Duration {
        Duration::from_secs(self.coarse_tick_secs)
    }

    pub fn fine_tick(&self) -> Duration {
        Duration::from_secs(self.fine_tick_secs)
    }

    pub fn grace(&self) -> Duration {
        Duration::from_secs(self.grace_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            initial_tick_secs: 2,
            coarse_tick_secs: 60,
            fine_tick_secs: 10,
            grace_secs: 15,
        }
    }
}

/// Timeout configuration for operator requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Operator API request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Operator API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Mount the `/admin` routes.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
