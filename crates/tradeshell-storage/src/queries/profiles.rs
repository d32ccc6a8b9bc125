// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Profile CRUD operations.

use chrono::{DateTime, Utc};
use rusqlite::params;

use tradeshell_core::{Profile, TradeshellError};

use crate::database::{Database, map_tr_err};
use crate::models::{fmt_ts, parse_ts};

fn profile_from_row(row: &rusqlite::Row<'_>) -> Result<Profile, rusqlite::Error> {
    Ok(Profile {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: parse_ts(&row.get::<_, String>(2)?)?,
        updated_at: parse_ts(&row.get::<_, String>(3)?)?,
    })
}

/// Create a new profile and return the stored row.
pub async fn create(
    db: &Database,
    name: &str,
    now: DateTime<Utc>,
) -> Result<Profile, TradeshellError> {
    let name = name.to_string();
    let ts = fmt_ts(now);
    db.connection()
        .call(move |conn| -> Result<Profile, rusqlite::Error> {
            conn.execute(
                "INSERT INTO profiles (name, created_at, updated_at) VALUES (?1, ?2, ?3)",
                params![name, ts, ts],
            )?;
            let id = conn.last_insert_rowid();
            conn.query_row(
                "SELECT id, name, created_at, updated_at FROM profiles WHERE id = ?1",
                params![id],
                profile_from_row,
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Get a profile by ID.
pub async fn get(db: &Database, id: i64) -> Result<Option<Profile>, TradeshellError> {
    db.connection()
        .call(move |conn| -> Result<Option<Profile>, rusqlite::Error> {
            let result = conn.query_row(
                "SELECT id, name, created_at, updated_at FROM profiles WHERE id = ?1",
                params![id],
                profile_from_row,
            );
            match result {
                Ok(profile) => Ok(Some(profile)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// List all profiles, newest-created first.
pub async fn list(db: &Database) -> Result<Vec<Profile>, TradeshellError> {
    db.connection()
        .call(|conn| -> Result<Vec<Profile>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, name, created_at, updated_at FROM profiles
                 ORDER BY created_at DESC, id DESC",
            )?;
            let rows = stmt.query_map([], profile_from_row)?;
            let mut profiles = Vec::new();
            for row in rows {
                profiles.push(row?);
            }
            Ok(profiles)
        })
        .await
        .map_err(map_tr_err)
}

/// Rename a profile. Returns `None` if the profile does not exist.
pub async fn rename(
    db: &Database,
    id: i64,
    name: &str,
    now: DateTime<Utc>,
) -> Result<Option<Profile>, TradeshellError> {
    let name = name.to_string();
    let ts = fmt_ts(now);
    db.connection()
        .call(move |conn| -> Result<Option<Profile>, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE profiles SET name = ?1, updated_at = ?2 WHERE id = ?3",
                params![name, ts, id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            conn.query_row(
                "SELECT id, name, created_at, updated_at FROM profiles WHERE id = ?1",
                params![id],
                profile_from_row,
            )
            .map(Some)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a profile, cascading to its broker accounts. Returns the deleted
/// row, or `None` if it did not exist.
pub async fn delete(db: &Database, id: i64) -> Result<Option<Profile>, TradeshellError> {
    db.connection()
        .call(move |conn| -> Result<Option<Profile>, rusqlite::Error> {
            let tx = conn.transaction()?;
            let existing = {
                let result = tx.query_row(
                    "SELECT id, name, created_at, updated_at FROM profiles WHERE id = ?1",
                    params![id],
                    profile_from_row,
                );
                match result {
                    Ok(profile) => Some(profile),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e),
                }
            };
            if existing.is_some() {
                tx.execute("DELETE FROM profiles WHERE id = ?1", params![id])?;
            }
            tx.commit()?;
            Ok(existing)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, d, h, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn create_and_get_roundtrips() {
        let db = setup_db().await;
        let created = create(&db, "Swing Desk", at(1, 9)).await.unwrap();
        assert_eq!(created.name, "Swing Desk");

        let fetched = get(&db, created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let db = setup_db().await;
        assert!(get(&db, 999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let db = setup_db().await;
        create(&db, "older", at(1, 9)).await.unwrap();
        create(&db, "newer", at(2, 9)).await.unwrap();

        let profiles = list(&db).await.unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].name, "newer");
        assert_eq!(profiles[1].name, "older");
    }

    #[tokio::test]
    async fn rename_updates_name_and_timestamp() {
        let db = setup_db().await;
        let profile = create(&db, "before", at(1, 9)).await.unwrap();

        let renamed = rename(&db, profile.id, "after", at(1, 10))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "after");
        assert_eq!(renamed.created_at, profile.created_at);
        assert!(renamed.updated_at > profile.updated_at);
    }

    #[tokio::test]
    async fn rename_missing_returns_none() {
        let db = setup_db().await;
        assert!(rename(&db, 404, "x", at(1, 9)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_returns_row_once() {
        let db = setup_db().await;
        let profile = create(&db, "doomed", at(1, 9)).await.unwrap();

        let deleted = delete(&db, profile.id).await.unwrap().unwrap();
        assert_eq!(deleted.id, profile.id);
        assert!(delete(&db, profile.id).await.unwrap().is_none());
        assert!(get(&db, profile.id).await.unwrap().is_none());
    }
}
