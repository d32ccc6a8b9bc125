// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer over storage and the credential cipher.
//!
//! The ledger is the only place credentials cross the plaintext/ciphertext
//! boundary: it encrypts on write and decrypts on read, so storage only
//! ever sees sealed blobs and callers only ever see [`BrokerAccount`]
//! records with plaintext fields.
//!
//! [`BrokerAccount`]: tradeshell_core::BrokerAccount

pub mod accounts;
pub mod profiles;

pub use accounts::BrokerAccountLedger;
pub use profiles::ProfileLedger;
