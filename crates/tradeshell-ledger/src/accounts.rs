// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Broker-account lifecycle plus data-source selection and usage tracking.
//!
//! Every write seals credentials through the [`CredentialCipher`] before it
//! reaches storage; every read unseals them before the record leaves the
//! ledger. Logs carry IDs and broker names, never credential material.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use tradeshell_cipher::CredentialCipher;
use tradeshell_core::{BrokerAccount, BrokerAccountPatch, NewBrokerAccount, TradeshellError};
use tradeshell_storage::queries::accounts;
use tradeshell_storage::{
    Database, InsertOutcome, NewStoredAccount, SelectionOutcome, StoredAccount, StoredAccountPatch,
};

/// Broker-account operations over the shared database handle.
#[derive(Clone)]
pub struct BrokerAccountLedger {
    db: Database,
    cipher: Arc<CredentialCipher>,
}

impl BrokerAccountLedger {
    pub fn new(db: Database, cipher: Arc<CredentialCipher>) -> Self {
        Self { db, cipher }
    }

    /// Create a broker account under a profile.
    ///
    /// Capability flags come from the broker's fixed table, not the caller.
    /// Fails with [`TradeshellError::DuplicateAccount`] when the profile
    /// already holds an account for this broker.
    pub async fn create(&self, new: NewBrokerAccount) -> Result<BrokerAccount, TradeshellError> {
        let stored = NewStoredAccount {
            profile_id: new.profile_id,
            broker_name: new.broker_name,
            display_name: new.display_name,
            account_id: new.account_id,
            api_key_encrypted: self.cipher.encrypt(&new.api_key)?,
            api_secret_encrypted: self.cipher.encrypt(&new.api_secret)?,
            supports_trading: new.broker_name.supports_trading(),
            supports_data: new.broker_name.supports_data(),
        };
        match accounts::insert(&self.db, stored, Utc::now()).await? {
            InsertOutcome::Created(row) => {
                info!(
                    account_id = row.id,
                    profile_id = row.profile_id,
                    broker = %row.broker_name,
                    "broker account created"
                );
                self.decrypt(row)
            }
            InsertOutcome::Duplicate => Err(TradeshellError::DuplicateAccount {
                profile_id: new.profile_id,
                broker: new.broker_name,
            }),
        }
    }

    /// Get an account by ID, credentials decrypted.
    pub async fn get(&self, id: i64) -> Result<BrokerAccount, TradeshellError> {
        let row = accounts::get(&self.db, id)
            .await?
            .ok_or(Self::not_found(id))?;
        self.decrypt(row)
    }

    /// All accounts of a profile, newest-created first, credentials
    /// decrypted.
    pub async fn list_by_profile(
        &self,
        profile_id: i64,
    ) -> Result<Vec<BrokerAccount>, TradeshellError> {
        let rows = accounts::list_by_profile(&self.db, profile_id).await?;
        rows.into_iter().map(|row| self.decrypt(row)).collect()
    }

    /// Apply a partial patch; supplied credential fields are re-encrypted.
    pub async fn update(
        &self,
        id: i64,
        patch: BrokerAccountPatch,
    ) -> Result<BrokerAccount, TradeshellError> {
        let stored = StoredAccountPatch {
            display_name: patch.display_name,
            account_id: patch.account_id,
            api_key_encrypted: patch
                .api_key
                .as_deref()
                .map(|key| self.cipher.encrypt(key))
                .transpose()?,
            api_secret_encrypted: patch
                .api_secret
                .as_deref()
                .map(|secret| self.cipher.encrypt(secret))
                .transpose()?,
            is_active: patch.is_active,
        };
        let row = accounts::update_fields(&self.db, id, stored, Utc::now())
            .await?
            .ok_or(Self::not_found(id))?;
        debug!(account_id = id, "broker account updated");
        self.decrypt(row)
    }

    /// Delete an account, returning its final state.
    pub async fn delete(&self, id: i64) -> Result<BrokerAccount, TradeshellError> {
        let row = accounts::delete(&self.db, id)
            .await?
            .ok_or(Self::not_found(id))?;
        info!(account_id = id, profile_id = row.profile_id, "broker account deleted");
        self.decrypt(row)
    }

    /// Make `account_id` the profile's exclusive data source.
    pub async fn set_data_source(
        &self,
        profile_id: i64,
        account_id: i64,
    ) -> Result<BrokerAccount, TradeshellError> {
        match accounts::select_data_source(&self.db, profile_id, account_id, Utc::now()).await? {
            SelectionOutcome::Selected(row) => {
                info!(
                    profile_id,
                    account_id,
                    broker = %row.broker_name,
                    "data source selected"
                );
                self.decrypt(row)
            }
            SelectionOutcome::NotFound => Err(Self::not_found(account_id)),
            SelectionOutcome::ForeignProfile => Err(TradeshellError::Constraint(format!(
                "broker account {account_id} does not belong to profile {profile_id}"
            ))),
            SelectionOutcome::NotDataCapable => Err(TradeshellError::Constraint(format!(
                "broker account {account_id} has no market-data feed"
            ))),
        }
    }

    /// The profile's selected, active data source, if any.
    pub async fn current_data_source(
        &self,
        profile_id: i64,
    ) -> Result<Option<BrokerAccount>, TradeshellError> {
        match accounts::current_data_source(&self.db, profile_id).await? {
            Some(row) => self.decrypt(row).map(Some),
            None => Ok(None),
        }
    }

    /// Record `count` data-API requests against an account. Counters roll
    /// over at local-calendar day and month boundaries.
    pub async fn track_api_usage(
        &self,
        id: i64,
        count: i64,
    ) -> Result<BrokerAccount, TradeshellError> {
        if count < 0 {
            return Err(TradeshellError::Constraint(
                "usage count must not be negative".to_string(),
            ));
        }
        let row = accounts::track_usage(&self.db, id, count, Utc::now())
            .await?
            .ok_or(Self::not_found(id))?;
        debug!(
            account_id = id,
            daily = row.daily_data_requests,
            monthly = row.monthly_data_requests,
            "usage tracked"
        );
        self.decrypt(row)
    }

    fn not_found(id: i64) -> TradeshellError {
        TradeshellError::NotFound {
            entity: "broker account",
            id,
        }
    }

    /// Unseal a stored row into the caller-facing shape.
    ///
    /// Decrypt failure here means the master secret changed or the row was
    /// tampered with; the row ID is logged so the operator can find it.
    fn decrypt(&self, row: StoredAccount) -> Result<BrokerAccount, TradeshellError> {
        let api_key = self.cipher.decrypt(&row.api_key_encrypted).map_err(|e| {
            warn!(account_id = row.id, "credential decrypt failed");
            e
        })?;
        let api_secret = self.cipher.decrypt(&row.api_secret_encrypted).map_err(|e| {
            warn!(account_id = row.id, "credential decrypt failed");
            e
        })?;
        Ok(BrokerAccount {
            id: row.id,
            profile_id: row.profile_id,
            broker_name: row.broker_name,
            display_name: row.display_name,
            account_id: row.account_id,
            api_key,
            api_secret,
            supports_trading: row.supports_trading,
            supports_data: row.supports_data,
            is_active: row.is_active,
            is_selected_for_data: row.is_selected_for_data,
            daily_data_requests: row.daily_data_requests,
            monthly_data_requests: row.monthly_data_requests,
            last_reset_date: row.last_reset_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
