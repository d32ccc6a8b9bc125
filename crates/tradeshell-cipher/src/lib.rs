// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential cipher for the Tradeshell backend.
//!
//! Turns short secret strings (broker API keys and secrets) into opaque,
//! self-contained ciphertext blobs: AES-256-GCM sealed with a key derived
//! per call from the master secret via Argon2id and a fresh random salt.
//! The master secret comes from configuration and is never stored alongside
//! the data.

pub mod aead;
pub mod cipher;
pub mod kdf;

pub use cipher::{CredentialCipher, DECRYPT_FAILED};
