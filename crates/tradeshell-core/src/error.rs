// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Tradeshell backend.

use thiserror::Error;

use crate::types::BrokerKind;

/// The primary error type used across all Tradeshell crates.
#[derive(Debug, Error)]
pub enum TradeshellError {
    /// Configuration errors (invalid TOML, missing master secret, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, corrupted rows).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Cipher errors. Decryption failures always carry the same message so a
    /// caller cannot distinguish wrong-key from tampered-blob.
    #[error("cipher error: {0}")]
    Cipher(String),

    /// A broker account already exists for this (profile, broker) pair.
    #[error("{broker} account already exists for profile {profile_id}")]
    DuplicateAccount { profile_id: i64, broker: BrokerKind },

    /// The operation target does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A domain constraint was violated (e.g. selecting a non-data-capable
    /// account as the data source).
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },
}

impl TradeshellError {
    /// Shorthand for a `Storage` error wrapping any error value.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(source),
        }
    }
}
