// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Broker-account CRUD, data-source selection, and usage tracking.
//!
//! The two read-modify-write operations (`select_data_source`,
//! `track_usage`) each run as a single transaction inside one `conn.call`
//! closure, so concurrent callers cannot interleave between their read and
//! write halves. Closures return typed outcome enums; the ledger maps them
//! to domain errors.

use chrono::{DateTime, Utc};
use rusqlite::params;

use tradeshell_core::usage;
use tradeshell_core::TradeshellError;

use crate::database::{Database, map_tr_err};
use crate::models::{NewStoredAccount, StoredAccount, StoredAccountPatch, fmt_ts};

/// Result of an insert attempt.
#[derive(Debug)]
pub enum InsertOutcome {
    /// The row was created.
    Created(StoredAccount),
    /// An account for this (profile, broker) pair already exists.
    Duplicate,
}

/// Result of a data-source selection attempt.
#[derive(Debug)]
pub enum SelectionOutcome {
    /// The target is now the profile's only selected data source.
    Selected(StoredAccount),
    /// No account with the given ID exists.
    NotFound,
    /// The account exists but belongs to a different profile.
    ForeignProfile,
    /// The account's broker has no market-data feed.
    NotDataCapable,
}

fn get_by_id(
    conn: &rusqlite::Connection,
    id: i64,
) -> Result<Option<StoredAccount>, rusqlite::Error> {
    let sql = format!(
        "SELECT {} FROM broker_accounts WHERE id = ?1",
        StoredAccount::COLUMNS
    );
    let result = conn.query_row(&sql, params![id], StoredAccount::from_row);
    match result {
        Ok(account) => Ok(Some(account)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Insert a new broker account unless the (profile, broker) pair is taken.
///
/// Existence check and insert share one transaction, so two racing creates
/// cannot both succeed.
pub async fn insert(
    db: &Database,
    new: NewStoredAccount,
    now: DateTime<Utc>,
) -> Result<InsertOutcome, TradeshellError> {
    let ts = fmt_ts(now);
    db.connection()
        .call(move |conn| -> Result<InsertOutcome, rusqlite::Error> {
            let tx = conn.transaction()?;

            let taken: i64 = tx.query_row(
                "SELECT COUNT(*) FROM broker_accounts WHERE profile_id = ?1 AND broker_name = ?2",
                params![new.profile_id, new.broker_name.to_string()],
                |row| row.get(0),
            )?;
            if taken > 0 {
                return Ok(InsertOutcome::Duplicate);
            }

            tx.execute(
                "INSERT INTO broker_accounts (
                     profile_id, broker_name, display_name, account_id,
                     api_key_encrypted, api_secret_encrypted,
                     supports_trading, supports_data, is_active, is_selected_for_data,
                     daily_data_requests, monthly_data_requests,
                     last_reset_date, created_at, updated_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, 0, 0, 0, ?9, ?9, ?9)",
                params![
                    new.profile_id,
                    new.broker_name.to_string(),
                    new.display_name,
                    new.account_id,
                    new.api_key_encrypted,
                    new.api_secret_encrypted,
                    new.supports_trading,
                    new.supports_data,
                    ts,
                ],
            )?;
            let id = tx.last_insert_rowid();
            let created = get_by_id(&tx, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            tx.commit()?;
            Ok(InsertOutcome::Created(created))
        })
        .await
        .map_err(map_tr_err)
}

/// Get an account by ID.
pub async fn get(db: &Database, id: i64) -> Result<Option<StoredAccount>, TradeshellError> {
    db.connection()
        .call(move |conn| get_by_id(conn, id))
        .await
        .map_err(map_tr_err)
}

/// List all accounts for a profile, newest-created first.
pub async fn list_by_profile(
    db: &Database,
    profile_id: i64,
) -> Result<Vec<StoredAccount>, TradeshellError> {
    db.connection()
        .call(move |conn| -> Result<Vec<StoredAccount>, rusqlite::Error> {
            let sql = format!(
                "SELECT {} FROM broker_accounts WHERE profile_id = ?1
                 ORDER BY created_at DESC, id DESC",
                StoredAccount::COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![profile_id], StoredAccount::from_row)?;
            let mut accounts = Vec::new();
            for row in rows {
                accounts.push(row?);
            }
            Ok(accounts)
        })
        .await
        .map_err(map_tr_err)
}

/// Apply a partial patch. Returns the updated row, or `None` if absent.
pub async fn update_fields(
    db: &Database,
    id: i64,
    patch: StoredAccountPatch,
    now: DateTime<Utc>,
) -> Result<Option<StoredAccount>, TradeshellError> {
    let ts = fmt_ts(now);
    db.connection()
        .call(move |conn| -> Result<Option<StoredAccount>, rusqlite::Error> {
            let tx = conn.transaction()?;
            let Some(current) = get_by_id(&tx, id)? else {
                return Ok(None);
            };

            let display_name = patch.display_name.unwrap_or(current.display_name);
            let account_id = patch.account_id.unwrap_or(current.account_id);
            let api_key = patch.api_key_encrypted.unwrap_or(current.api_key_encrypted);
            let api_secret = patch
                .api_secret_encrypted
                .unwrap_or(current.api_secret_encrypted);
            let is_active = patch.is_active.unwrap_or(current.is_active);

            tx.execute(
                "UPDATE broker_accounts
                 SET display_name = ?1, account_id = ?2, api_key_encrypted = ?3,
                     api_secret_encrypted = ?4, is_active = ?5, updated_at = ?6
                 WHERE id = ?7",
                params![display_name, account_id, api_key, api_secret, is_active, ts, id],
            )?;
            let updated = get_by_id(&tx, id)?;
            tx.commit()?;
            Ok(updated)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete an account. Returns the deleted row, or `None` if absent.
pub async fn delete(db: &Database, id: i64) -> Result<Option<StoredAccount>, TradeshellError> {
    db.connection()
        .call(move |conn| -> Result<Option<StoredAccount>, rusqlite::Error> {
            let tx = conn.transaction()?;
            let existing = get_by_id(&tx, id)?;
            if existing.is_some() {
                tx.execute("DELETE FROM broker_accounts WHERE id = ?1", params![id])?;
            }
            tx.commit()?;
            Ok(existing)
        })
        .await
        .map_err(map_tr_err)
}

/// Make `account_id` the profile's only selected data source.
///
/// Validation, clear-all, and set-one share one transaction: after commit,
/// exactly one account of the profile is selected; on any non-`Selected`
/// outcome the prior selection is untouched (the transaction never commits
/// a partial state).
pub async fn select_data_source(
    db: &Database,
    profile_id: i64,
    account_id: i64,
    now: DateTime<Utc>,
) -> Result<SelectionOutcome, TradeshellError> {
    let ts = fmt_ts(now);
    db.connection()
        .call(move |conn| -> Result<SelectionOutcome, rusqlite::Error> {
            let tx = conn.transaction()?;

            let Some(target) = get_by_id(&tx, account_id)? else {
                return Ok(SelectionOutcome::NotFound);
            };
            if target.profile_id != profile_id {
                return Ok(SelectionOutcome::ForeignProfile);
            }
            if !target.supports_data {
                return Ok(SelectionOutcome::NotDataCapable);
            }

            tx.execute(
                "UPDATE broker_accounts SET is_selected_for_data = 0, updated_at = ?1
                 WHERE profile_id = ?2 AND is_selected_for_data = 1",
                params![ts, profile_id],
            )?;
            tx.execute(
                "UPDATE broker_accounts SET is_selected_for_data = 1, updated_at = ?1
                 WHERE id = ?2",
                params![ts, account_id],
            )?;

            let selected =
                get_by_id(&tx, account_id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            tx.commit()?;
            Ok(SelectionOutcome::Selected(selected))
        })
        .await
        .map_err(map_tr_err)
}

/// The profile's selected and active data source, if any.
pub async fn current_data_source(
    db: &Database,
    profile_id: i64,
) -> Result<Option<StoredAccount>, TradeshellError> {
    db.connection()
        .call(move |conn| -> Result<Option<StoredAccount>, rusqlite::Error> {
            let sql = format!(
                "SELECT {} FROM broker_accounts
                 WHERE profile_id = ?1 AND is_selected_for_data = 1 AND is_active = 1",
                StoredAccount::COLUMNS
            );
            let result = conn.query_row(&sql, params![profile_id], StoredAccount::from_row);
            match result {
                Ok(account) => Ok(Some(account)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Apply `n` API requests to an account's usage counters, resetting across
/// calendar boundaries per [`usage::rollover`].
///
/// Read, rollover, and write share one transaction, so concurrent trackers
/// cannot lose updates. Returns the updated row, or `None` if absent.
pub async fn track_usage(
    db: &Database,
    id: i64,
    n: i64,
    now: DateTime<Utc>,
) -> Result<Option<StoredAccount>, TradeshellError> {
    let ts = fmt_ts(now);
    db.connection()
        .call(move |conn| -> Result<Option<StoredAccount>, rusqlite::Error> {
            let tx = conn.transaction()?;
            let Some(current) = get_by_id(&tx, id)? else {
                return Ok(None);
            };

            let out = usage::rollover(
                current.last_reset_date,
                now,
                current.daily_data_requests,
                current.monthly_data_requests,
                n,
            );
            let last_reset = if out.reset_fired {
                ts.clone()
            } else {
                fmt_ts(current.last_reset_date)
            };

            tx.execute(
                "UPDATE broker_accounts
                 SET daily_data_requests = ?1, monthly_data_requests = ?2,
                     last_reset_date = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![out.daily, out.monthly, last_reset, ts, id],
            )?;
            let updated = get_by_id(&tx, id)?;
            tx.commit()?;
            Ok(updated)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::profiles;
    use chrono::TimeZone;
    use tradeshell_core::BrokerKind;

    fn at(mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, mo, d, h, 0, 0).unwrap()
    }

    fn new_account(profile_id: i64, broker: BrokerKind) -> NewStoredAccount {
        NewStoredAccount {
            profile_id,
            broker_name: broker,
            display_name: format!("My {broker} Account"),
            account_id: "ACC-1".to_string(),
            api_key_encrypted: "blob-key".to_string(),
            api_secret_encrypted: "blob-secret".to_string(),
            supports_trading: broker.supports_trading(),
            supports_data: broker.supports_data(),
        }
    }

    async fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let profile = profiles::create(&db, "desk", at(1, 1, 9)).await.unwrap();
        (db, profile.id)
    }

    async fn insert_ok(db: &Database, new: NewStoredAccount, now: DateTime<Utc>) -> StoredAccount {
        match insert(db, new, now).await.unwrap() {
            InsertOutcome::Created(account) => account,
            InsertOutcome::Duplicate => panic!("unexpected duplicate"),
        }
    }

    #[tokio::test]
    async fn insert_then_get_roundtrips() {
        let (db, pid) = setup().await;
        let created = insert_ok(&db, new_account(pid, BrokerKind::Fyers), at(1, 2, 9)).await;

        assert!(created.supports_data);
        assert!(created.supports_trading);
        assert!(created.is_active);
        assert!(!created.is_selected_for_data);
        assert_eq!(created.daily_data_requests, 0);

        let fetched = get(&db, created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn duplicate_pair_is_rejected_but_other_broker_succeeds() {
        let (db, pid) = setup().await;
        insert_ok(&db, new_account(pid, BrokerKind::Fyers), at(1, 2, 9)).await;

        let dup = insert(&db, new_account(pid, BrokerKind::Fyers), at(1, 2, 10))
            .await
            .unwrap();
        assert!(matches!(dup, InsertOutcome::Duplicate));

        insert_ok(&db, new_account(pid, BrokerKind::Zerodha), at(1, 2, 11)).await;
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let (db, pid) = setup().await;
        insert_ok(&db, new_account(pid, BrokerKind::Fyers), at(1, 2, 9)).await;
        insert_ok(&db, new_account(pid, BrokerKind::Upstox), at(1, 3, 9)).await;

        let accounts = list_by_profile(&db, pid).await.unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].broker_name, BrokerKind::Upstox);
        assert_eq!(accounts[1].broker_name, BrokerKind::Fyers);
    }

    #[tokio::test]
    async fn patch_changes_only_supplied_fields() {
        let (db, pid) = setup().await;
        let account = insert_ok(&db, new_account(pid, BrokerKind::Fyers), at(1, 2, 9)).await;

        let patch = StoredAccountPatch {
            display_name: Some("Renamed".to_string()),
            is_active: Some(false),
            ..Default::default()
        };
        let updated = update_fields(&db, account.id, patch, at(1, 2, 10))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.display_name, "Renamed");
        assert!(!updated.is_active);
        assert_eq!(updated.account_id, account.account_id);
        assert_eq!(updated.api_key_encrypted, account.api_key_encrypted);
    }

    #[tokio::test]
    async fn patch_missing_account_returns_none() {
        let (db, _pid) = setup().await;
        let result = update_fields(&db, 404, StoredAccountPatch::default(), at(1, 2, 9))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_cascades_from_profile() {
        let (db, pid) = setup().await;
        let account = insert_ok(&db, new_account(pid, BrokerKind::Fyers), at(1, 2, 9)).await;

        profiles::delete(&db, pid).await.unwrap().unwrap();
        assert!(get(&db, account.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn selection_is_exclusive_per_profile() {
        let (db, pid) = setup().await;
        let a = insert_ok(&db, new_account(pid, BrokerKind::Fyers), at(1, 2, 9)).await;
        let b = insert_ok(&db, new_account(pid, BrokerKind::Upstox), at(1, 2, 10)).await;

        let out = select_data_source(&db, pid, a.id, at(1, 3, 9)).await.unwrap();
        assert!(matches!(out, SelectionOutcome::Selected(_)));

        let out = select_data_source(&db, pid, b.id, at(1, 3, 10)).await.unwrap();
        assert!(matches!(out, SelectionOutcome::Selected(_)));

        let a = get(&db, a.id).await.unwrap().unwrap();
        let b = get(&db, b.id).await.unwrap().unwrap();
        assert!(!a.is_selected_for_data);
        assert!(b.is_selected_for_data);
    }

    #[tokio::test]
    async fn selection_rejects_non_data_broker_and_keeps_prior() {
        let (db, pid) = setup().await;
        let data = insert_ok(&db, new_account(pid, BrokerKind::Fyers), at(1, 2, 9)).await;
        let no_data = insert_ok(&db, new_account(pid, BrokerKind::Zerodha), at(1, 2, 10)).await;

        select_data_source(&db, pid, data.id, at(1, 3, 9)).await.unwrap();

        let out = select_data_source(&db, pid, no_data.id, at(1, 3, 10))
            .await
            .unwrap();
        assert!(matches!(out, SelectionOutcome::NotDataCapable));

        // Prior selection survives the failed call.
        let still = current_data_source(&db, pid).await.unwrap().unwrap();
        assert_eq!(still.id, data.id);
    }

    #[tokio::test]
    async fn selection_rejects_foreign_profile() {
        let (db, pid) = setup().await;
        let other = profiles::create(&db, "other", at(1, 1, 10)).await.unwrap();
        let theirs = insert_ok(&db, new_account(other.id, BrokerKind::Fyers), at(1, 2, 9)).await;

        let out = select_data_source(&db, pid, theirs.id, at(1, 3, 9))
            .await
            .unwrap();
        assert!(matches!(out, SelectionOutcome::ForeignProfile));
    }

    #[tokio::test]
    async fn current_data_source_ignores_inactive() {
        let (db, pid) = setup().await;
        let a = insert_ok(&db, new_account(pid, BrokerKind::Fyers), at(1, 2, 9)).await;
        select_data_source(&db, pid, a.id, at(1, 3, 9)).await.unwrap();

        let patch = StoredAccountPatch {
            is_active: Some(false),
            ..Default::default()
        };
        update_fields(&db, a.id, patch, at(1, 3, 10)).await.unwrap();

        assert!(current_data_source(&db, pid).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn usage_accumulates_within_a_day() {
        let (db, pid) = setup().await;
        let a = insert_ok(&db, new_account(pid, BrokerKind::Fyers), at(3, 14, 9)).await;

        track_usage(&db, a.id, 5, at(3, 14, 10)).await.unwrap();
        let after = track_usage(&db, a.id, 5, at(3, 14, 11))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(after.daily_data_requests, 10);
        assert_eq!(after.monthly_data_requests, 10);
    }

    #[tokio::test]
    async fn usage_resets_daily_across_midnight_but_not_monthly() {
        let (db, pid) = setup().await;
        let a = insert_ok(&db, new_account(pid, BrokerKind::Fyers), at(3, 13, 9)).await;

        // Accumulate 40 on day one.
        track_usage(&db, a.id, 40, at(3, 13, 10)).await.unwrap();

        let after = track_usage(&db, a.id, 3, at(3, 14, 1)).await.unwrap().unwrap();
        assert_eq!(after.daily_data_requests, 3);
        assert_eq!(after.monthly_data_requests, 43);
        assert_eq!(after.last_reset_date, at(3, 14, 1));
    }

    #[tokio::test]
    async fn usage_resets_both_across_month() {
        let (db, pid) = setup().await;
        let a = insert_ok(&db, new_account(pid, BrokerKind::Fyers), at(3, 31, 9)).await;
        track_usage(&db, a.id, 40, at(3, 31, 10)).await.unwrap();

        let after = track_usage(&db, a.id, 2, at(4, 1, 9)).await.unwrap().unwrap();
        assert_eq!(after.daily_data_requests, 2);
        assert_eq!(after.monthly_data_requests, 2);
    }

    #[tokio::test]
    async fn usage_on_missing_account_returns_none() {
        let (db, _pid) = setup().await;
        assert!(track_usage(&db, 404, 1, at(3, 14, 9)).await.unwrap().is_none());
    }
}
