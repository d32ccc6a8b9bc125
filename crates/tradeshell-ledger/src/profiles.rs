// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Profile lifecycle: create, get, list, rename, delete.

use chrono::Utc;
use tracing::info;

use tradeshell_core::{Profile, TradeshellError};
use tradeshell_storage::queries::profiles;
use tradeshell_storage::Database;

/// Profile operations over the shared database handle.
#[derive(Clone)]
pub struct ProfileLedger {
    db: Database,
}

impl ProfileLedger {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a profile with the given name.
    pub async fn create(&self, name: &str) -> Result<Profile, TradeshellError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TradeshellError::Constraint(
                "profile name must not be empty".to_string(),
            ));
        }
        let profile = profiles::create(&self.db, name, Utc::now()).await?;
        info!(profile_id = profile.id, name = %profile.name, "profile created");
        Ok(profile)
    }

    /// Get a profile by ID.
    pub async fn get(&self, id: i64) -> Result<Profile, TradeshellError> {
        profiles::get(&self.db, id).await?.ok_or(TradeshellError::NotFound {
            entity: "profile",
            id,
        })
    }

    /// All profiles, newest-created first.
    pub async fn list(&self) -> Result<Vec<Profile>, TradeshellError> {
        profiles::list(&self.db).await
    }

    /// Rename a profile.
    pub async fn rename(&self, id: i64, name: &str) -> Result<Profile, TradeshellError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TradeshellError::Constraint(
                "profile name must not be empty".to_string(),
            ));
        }
        let profile = profiles::rename(&self.db, id, name, Utc::now())
            .await?
            .ok_or(TradeshellError::NotFound {
                entity: "profile",
                id,
            })?;
        info!(profile_id = id, name = %profile.name, "profile renamed");
        Ok(profile)
    }

    /// Delete a profile; its broker accounts go with it.
    pub async fn delete(&self, id: i64) -> Result<Profile, TradeshellError> {
        let profile = profiles::delete(&self.db, id)
            .await?
            .ok_or(TradeshellError::NotFound {
                entity: "profile",
                id,
            })?;
        info!(profile_id = id, "profile deleted");
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn ledger() -> ProfileLedger {
        let db = Database::open_in_memory().await.unwrap();
        ProfileLedger::new(db)
    }

    #[tokio::test]
    async fn create_rename_delete_lifecycle() {
        let ledger = ledger().await;

        let created = ledger.create("swing desk").await.unwrap();
        assert_eq!(created.name, "swing desk");

        let renamed = ledger.rename(created.id, "intraday desk").await.unwrap();
        assert_eq!(renamed.name, "intraday desk");
        assert_eq!(ledger.get(created.id).await.unwrap().name, "intraday desk");

        let deleted = ledger.delete(created.id).await.unwrap();
        assert_eq!(deleted.id, created.id);
        assert!(matches!(
            ledger.get(created.id).await,
            Err(TradeshellError::NotFound { entity: "profile", .. })
        ));
    }

    #[tokio::test]
    async fn blank_names_are_rejected() {
        let ledger = ledger().await;
        assert!(matches!(
            ledger.create("   ").await,
            Err(TradeshellError::Constraint(_))
        ));

        let profile = ledger.create("desk").await.unwrap();
        assert!(matches!(
            ledger.rename(profile.id, "").await,
            Err(TradeshellError::Constraint(_))
        ));
    }

    #[tokio::test]
    async fn missing_profile_maps_to_not_found() {
        let ledger = ledger().await;
        for result in [
            ledger.get(404).await,
            ledger.rename(404, "x").await,
            ledger.delete(404).await,
        ] {
            assert!(matches!(
                result,
                Err(TradeshellError::NotFound { entity: "profile", id: 404 })
            ));
        }
    }
}
