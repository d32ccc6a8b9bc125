// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Tradeshell trading-assistant backend.
//!
//! Provides the error taxonomy, the broker/profile domain types, and the
//! calendar rollover rule for API usage counters. Every other workspace
//! crate builds on these definitions.

pub mod error;
pub mod types;
pub mod usage;

// Re-export key items at crate root for ergonomic imports.
pub use error::TradeshellError;
pub use types::{BrokerAccount, BrokerAccountPatch, BrokerKind, NewBrokerAccount, Profile};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_render_messages() {
        let dup = TradeshellError::DuplicateAccount {
            profile_id: 3,
            broker: BrokerKind::Fyers,
        };
        assert_eq!(dup.to_string(), "fyers account already exists for profile 3");

        let missing = TradeshellError::NotFound {
            entity: "broker account",
            id: 42,
        };
        assert_eq!(missing.to_string(), "broker account 42 not found");

        let cipher = TradeshellError::Cipher("invalid key or corrupted data".into());
        assert!(cipher.to_string().starts_with("cipher error:"));
    }

    #[test]
    fn storage_error_wraps_source() {
        let err = TradeshellError::storage(std::io::Error::other("disk gone"));
        assert!(err.to_string().contains("disk gone"));
    }
}
