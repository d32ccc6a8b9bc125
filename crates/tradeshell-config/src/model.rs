// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Tradeshell backend.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Tradeshell configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values — except the cipher master secret, which must be supplied before
/// any credential operation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TradeshellConfig {
    /// Application identity and logging settings.
    #[serde(default)]
    pub app: AppConfig,

    /// SQLite storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Credential cipher settings.
    #[serde(default)]
    pub cipher: CipherConfig,

    /// UI bridge (HTTP gateway) settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Application identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Display name of the application instance.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_app_name() -> String {
    "tradeshell".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// SQLite storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("tradeshell/tradeshell.db").display().to_string())
        .unwrap_or_else(|| "tradeshell.db".to_string())
}

/// Credential cipher configuration.
///
/// `master_secret` is typically supplied via `TRADESHELL_CIPHER_MASTER_SECRET`
/// rather than written to a config file. Its absence is a startup-fatal
/// error for any command that touches stored credentials.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CipherConfig {
    /// Master secret from which per-blob encryption keys are derived.
    #[serde(default)]
    pub master_secret: Option<String>,
}

/// UI bridge (HTTP gateway) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind. Defaults to loopback: the bridge serves a
    /// same-machine renderer.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bearer token for bridge auth. `None` leaves the bridge open
    /// (loopback desktop mode); a startup warning is logged.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
            bearer_token: None,
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    7847
}
