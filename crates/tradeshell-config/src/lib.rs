// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Tradeshell backend.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, and environment
//! variable overrides via the `TRADESHELL_` prefix.
//!
//! # Usage
//!
//! ```no_run
//! let config = tradeshell_config::load_and_validate().expect("config errors");
//! println!("database: {}", config.storage.database_path);
//! ```

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    AppConfig, CipherConfig, GatewayConfig, StorageConfig, TradeshellConfig,
};
pub use validation::{ConfigError, render_errors, validate_config};

/// Load configuration from the XDG hierarchy and validate it.
///
/// Returns either a valid `TradeshellConfig` or the list of collected
/// configuration errors.
pub fn load_and_validate() -> Result<TradeshellConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(vec![ConfigError::Parse(err.to_string())]),
    }
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<TradeshellConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(vec![ConfigError::Parse(err.to_string())]),
    }
}
