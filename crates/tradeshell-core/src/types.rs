// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Tradeshell workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// A supported broker integration.
///
/// The set is closed: a profile can hold at most one account per variant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BrokerKind {
    Zerodha,
    Fyers,
    Mstock,
    Dhan,
    Shoonya,
    Upstox,
}

impl BrokerKind {
    /// Whether this broker offers a market-data feed.
    ///
    /// Fixed capability table; `is_selected_for_data` may only ever be set on
    /// accounts whose broker returns true here.
    pub fn supports_data(self) -> bool {
        matches!(
            self,
            BrokerKind::Fyers | BrokerKind::Upstox | BrokerKind::Shoonya | BrokerKind::Mstock
        )
    }

    /// Whether this broker supports order placement. True for every
    /// supported broker.
    pub fn supports_trading(self) -> bool {
        true
    }

    /// Human-readable broker name for display surfaces.
    pub fn label(self) -> &'static str {
        match self {
            BrokerKind::Zerodha => "Zerodha (Kite)",
            BrokerKind::Fyers => "Fyers",
            BrokerKind::Mstock => "Mirae Asset (mStock)",
            BrokerKind::Dhan => "Dhan",
            BrokerKind::Shoonya => "Shoonya (Finvasia)",
            BrokerKind::Upstox => "Upstox",
        }
    }
}

/// A named container owning zero or more broker accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A broker account as returned to callers: credentials decrypted.
///
/// Plaintext `api_key`/`api_secret` exist only in this transient shape.
/// The persisted row holds ciphertext blobs instead (see
/// `tradeshell-storage::models::StoredAccount`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerAccount {
    pub id: i64,
    pub profile_id: i64,
    pub broker_name: BrokerKind,
    pub display_name: String,
    pub account_id: String,
    pub api_key: String,
    pub api_secret: String,
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

/// Fields accepted when creating a broker account.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBrokerAccount {
    pub profile_id: i64,
    pub broker_name: BrokerKind,
    pub display_name: String,
    pub account_id: String,
    pub api_key: String,
    pub api_secret: String,
}

/// Partial patch for a broker account. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerAccountPatch {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_secret: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn broker_kind_round_trips_through_strings() {
        for kind in BrokerKind::iter() {
            let s = kind.to_string();
            assert_eq!(BrokerKind::from_str(&s).unwrap(), kind);
        }
    }

    #[test]
    fn broker_kind_serde_uses_lowercase() {
        let json = serde_json::to_string(&BrokerKind::Zerodha).unwrap();
        assert_eq!(json, "\"zerodha\"");
        let parsed: BrokerKind = serde_json::from_str("\"upstox\"").unwrap();
        assert_eq!(parsed, BrokerKind::Upstox);
    }

    #[test]
    fn data_capability_table() {
        assert!(BrokerKind::Fyers.supports_data());
        assert!(BrokerKind::Upstox.supports_data());
        assert!(BrokerKind::Shoonya.supports_data());
        assert!(BrokerKind::Mstock.supports_data());
        assert!(!BrokerKind::Zerodha.supports_data());
        assert!(!BrokerKind::Dhan.supports_data());
    }

    #[test]
    fn every_broker_supports_trading() {
        for kind in BrokerKind::iter() {
            assert!(kind.supports_trading());
        }
    }
}
