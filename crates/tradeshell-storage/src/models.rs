// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types for storage entities and timestamp conversion helpers.
//!
//! `StoredAccount` is the persisted shape of a broker account: credential
//! fields hold ciphertext blobs. The decrypted-for-caller shape lives in
//! `tradeshell-core` and is produced by the ledger.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};

use tradeshell_core::types::BrokerKind;

/// A broker account row as persisted: credentials encrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAccount {
    pub id: i64,
    pub profile_id: i64,
    pub broker_name: BrokerKind,
    pub display_name: String,
    pub account_id: String,
    pub api_key_encrypted: String,
    pub api_secret_encrypted: String,
    pub supports_trading: bool,
    pub supports_data: bool,
    pub is_active: bool,
    pub is_selected_for_data: bool,
    pub daily_data_requests: i64,
    pub monthly_data_requests: i64,
    pub last_reset_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a new broker account row.
#[derive(Debug, Clone)]
pub struct NewStoredAccount {
    pub profile_id: i64,
    pub broker_name: BrokerKind,
    pub display_name: String,
    pub account_id: String,
    pub api_key_encrypted: String,
    pub api_secret_encrypted: String,
    pub supports_trading: bool,
    pub supports_data: bool,
}

/// Partial patch applied to a stored account. Encrypted fields arrive
/// already sealed by the cipher.
#[derive(Debug, Clone, Default)]
pub struct StoredAccountPatch {
    pub display_name: Option<String>,
    pub account_id: Option<String>,
    pub api_key_encrypted: Option<String>,
    pub api_secret_encrypted: Option<String>,
    pub is_active: Option<bool>,
}

/// Format a timestamp for storage as RFC 3339 TEXT.
pub(crate) fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored RFC 3339 timestamp. A malformed value is surfaced as a
/// column conversion failure.
pub(crate) fn parse_ts(raw: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Parse a stored broker name. A value outside the closed enumeration is a
/// column conversion failure.
pub(crate) fn parse_broker(raw: &str) -> Result<BrokerKind, rusqlite::Error> {
    BrokerKind::from_str(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

impl StoredAccount {
    /// Map a full `SELECT *`-ordered row (see [`COLUMNS`](Self::COLUMNS)).
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(0)?,
            profile_id: row.get(1)?,
            broker_name: parse_broker(&row.get::<_, String>(2)?)?,
            display_name: row.get(3)?,
            account_id: row.get(4)?,
            api_key_encrypted: row.get(5)?,
            api_secret_encrypted: row.get(6)?,
            supports_trading: row.get(7)?,
            supports_data: row.get(8)?,
            is_active: row.get(9)?,
            is_selected_for_data: row.get(10)?,
            daily_data_requests: row.get(11)?,
            monthly_data_requests: row.get(12)?,
            last_reset_date: parse_ts(&row.get::<_, String>(13)?)?,
            created_at: parse_ts(&row.get::<_, String>(14)?)?,
            updated_at: parse_ts(&row.get::<_, String>(15)?)?,
        })
    }

    /// Column list matching [`from_row`](Self::from_row) ordinals.
    pub(crate) const COLUMNS: &'static str = "id, profile_id, broker_name, display_name, \
         account_id, api_key_encrypted, api_secret_encrypted, supports_trading, supports_data, \
         is_active, is_selected_for_data, daily_data_requests, monthly_data_requests, \
         last_reset_date, created_at, updated_at";
}
