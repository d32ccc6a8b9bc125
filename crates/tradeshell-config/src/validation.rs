// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes. Collects every violation instead of failing fast so the user
//! sees all problems in one run.

use thiserror::Error;

use crate::model::TradeshellConfig;

/// A single configuration problem.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Deserialization failed (bad TOML, unknown key, wrong type).
    #[error("{0}")]
    Parse(String),

    /// A semantic constraint was violated.
    #[error("{message}")]
    Validation { message: String },
}

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors.
pub fn validate_config(config: &TradeshellConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if let Some(secret) = &config.cipher.master_secret
        && secret.len() < 12
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "cipher.master_secret must be at least 12 characters, got {}",
                secret.len()
            ),
        });
    }

    if let Some(token) = &config.gateway.bearer_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "gateway.bearer_token must not be blank when set (omit it to disable auth)"
                .to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Print collected configuration errors to stderr, one per line.
pub fn render_errors(errors: &[ConfigError]) {
    eprintln!("tradeshell: configuration is invalid:");
    for err in errors {
        eprintln!("  - {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TradeshellConfig;

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&TradeshellConfig::default()).is_ok());
    }

    #[test]
    fn short_master_secret_is_rejected() {
        let mut config = TradeshellConfig::default();
        config.cipher.master_secret = Some("short".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("master_secret"));
    }

    #[test]
    fn all_violations_are_collected() {
        let mut config = TradeshellConfig::default();
        config.storage.database_path = " ".to_string();
        config.gateway.host = String::new();
        config.cipher.master_secret = Some("tiny".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn blank_bearer_token_is_rejected() {
        let mut config = TradeshellConfig::default();
        config.gateway.bearer_token = Some("  ".to_string());
        assert!(validate_config(&config).is_err());
    }
}
