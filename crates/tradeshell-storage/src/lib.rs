// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for profiles and broker accounts.
//!
//! All access goes through a single [`Database`] handle backed by one
//! `tokio-rusqlite` connection, which serializes writes. Schema lives in
//! embedded refinery migrations and is applied on open.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
pub use models::{NewStoredAccount, StoredAccount, StoredAccountPatch};
pub use queries::accounts::{InsertOutcome, SelectionOutcome};
