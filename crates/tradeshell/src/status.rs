// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tradeshell status` command implementation.
//!
//! Queries a running daemon's unauthenticated health endpoint and reports
//! whether it is up. Falls back gracefully when the daemon is not running.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use tradeshell_config::TradeshellConfig;
use tradeshell_core::TradeshellError;

/// Health payload inside the gateway's response envelope.
#[derive(Debug, Deserialize)]
struct HealthData {
    status: String,
    version: String,
    uptime_secs: u64,
}

#[derive(Debug, Deserialize)]
struct HealthEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<HealthData>,
}

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub running: bool,
    pub status: String,
    pub version: Option<String>,
    pub uptime_secs: Option<u64>,
    pub uptime_human: Option<String>,
    pub gateway_host: String,
    pub gateway_port: u16,
}

/// Format seconds into a human-readable duration string.
fn format_uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

fn print_status(response: &StatusResponse, json: bool) -> Result<(), TradeshellError> {
    if json {
        let rendered = serde_json::to_string_pretty(response)
            .map_err(|e| TradeshellError::Config(format!("failed to render status: {e}")))?;
        println!("{rendered}");
    } else if response.running {
        println!(
            "tradeshell is running on {}:{} (status: {}, up {})",
            response.gateway_host,
            response.gateway_port,
            response.status,
            response.uptime_human.as_deref().unwrap_or("unknown"),
        );
    } else {
        println!(
            "tradeshell is not running on {}:{}",
            response.gateway_host, response.gateway_port
        );
    }
    Ok(())
}

/// Run the `tradeshell status` command.
pub async fn run_status(config: &TradeshellConfig, json: bool) -> Result<(), TradeshellError> {
    let host = &config.gateway.host;
    let port = config.gateway.port;
    let url = format!("http://{host}:{port}/health");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
        .map_err(|e| TradeshellError::Config(format!("failed to create HTTP client: {e}")))?;

    let down = |status: &str| StatusResponse {
        running: false,
        status: status.to_string(),
        version: None,
        uptime_secs: None,
        uptime_human: None,
        gateway_host: host.clone(),
        gateway_port: port,
    };

    let response = match client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => {
            match resp.json::<HealthEnvelope>().await {
                Ok(envelope) if envelope.success => match envelope.data {
                    Some(health) => StatusResponse {
                        running: true,
                        status: health.status,
                        version: Some(health.version),
                        uptime_secs: Some(health.uptime_secs),
                        uptime_human: Some(format_uptime(health.uptime_secs)),
                        gateway_host: host.clone(),
                        gateway_port: port,
                    },
                    None => down("unexpected health response"),
                },
                _ => down("unexpected health response"),
            }
        }
        Ok(resp) => down(&format!("health endpoint returned {}", resp.status())),
        Err(_) => down("not running"),
    };

    print_status(&response, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(59), "0m");
        assert_eq!(format_uptime(3_660), "1h 1m");
        assert_eq!(format_uptime(90_061), "1d 1h 1m");
    }

    #[test]
    fn health_envelope_parses_gateway_shape() {
        let body = r#"{
            "success": true,
            "data": { "status": "ok", "version": "0.1.0", "uptime_secs": 42 }
        }"#;
        let envelope: HealthEnvelope = serde_json::from_str(body).unwrap();
        assert!(envelope.success);
        let health = envelope.data.unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.uptime_secs, 42);
    }
}
