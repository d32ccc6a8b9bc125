// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./tradeshell.toml` >
//! `~/.config/tradeshell/tradeshell.toml` > `/etc/tradeshell/tradeshell.toml`
//! with environment variable overrides via the `TRADESHELL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::TradeshellConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/tradeshell/tradeshell.toml` (system-wide)
/// 3. `~/.config/tradeshell/tradeshell.toml` (user XDG config)
/// 4. `./tradeshell.toml` (local directory)
/// 5. `TRADESHELL_*` environment variables
pub fn load_config() -> Result<TradeshellConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TradeshellConfig::default()))
        .merge(Toml::file("/etc/tradeshell/tradeshell.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("tradeshell/tradeshell.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("tradeshell.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<TradeshellConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TradeshellConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TradeshellConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TradeshellConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `TRADESHELL_CIPHER_MASTER_SECRET` must
/// map to `cipher.master_secret`, not `cipher.master.secret`.
fn env_provider() -> Env {
    Env::prefixed("TRADESHELL_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("app_", "app.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("cipher_", "cipher.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_toml_overrides_defaults() {
        let config = load_config_from_str(
            "[gateway]\nport = 9000\n\n[cipher]\nmaster_secret = \"hunter2-but-longer\"\n",
        )
        .unwrap();
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(
            config.cipher.master_secret.as_deref(),
            Some("hunter2-but-longer")
        );
        // Untouched sections keep defaults.
        assert_eq!(config.app.name, "tradeshell");
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.gateway.host, "127.0.0.1");
    }
}
