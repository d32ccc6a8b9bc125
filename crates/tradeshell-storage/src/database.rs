// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use tracing::debug;

use tradeshell_core::TradeshellError;

use crate::migrations;

/// Handle to the single process-wide SQLite connection.
///
/// Created once at startup, shared by reference, closed exactly once at
/// orderly shutdown.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run all
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, TradeshellError> {
        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(TradeshellError::storage)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| map_tr_err(e.into()))?;
        Self::prepare(&conn).await?;
        debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// Open an in-memory database. Test use only; the schema is migrated
    /// the same way as on disk.
    pub async fn open_in_memory() -> Result<Self, TradeshellError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| map_tr_err(e.into()))?;
        Self::prepare(&conn).await?;
        Ok(Self { conn })
    }

    async fn prepare(conn: &tokio_rusqlite::Connection) -> Result<(), TradeshellError> {
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA synchronous=NORMAL;
                 PRAGMA foreign_keys=ON;
                 PRAGMA busy_timeout=5000;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| -> Result<Result<(), TradeshellError>, rusqlite::Error> {
            Ok(migrations::run_migrations(conn))
        })
        .await
        .map_err(map_tr_err)??;
        Ok(())
    }

    /// Returns the underlying connection handle.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL and close the connection.
    ///
    /// Call once at orderly shutdown.
    pub async fn close(self) -> Result<(), TradeshellError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        self.conn.close().await.map_err(map_tr_err)
    }
}

/// Convert tokio-rusqlite errors to `TradeshellError::Storage`.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> TradeshellError {
    TradeshellError::Storage {
        source: Box::new(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        let tables: Vec<String> = db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type='table' ORDER BY name",
                )?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                let mut names = Vec::new();
                for row in rows {
                    names.push(row?);
                }
                Ok(names)
            })
            .await
            .unwrap();

        assert!(tables.contains(&"profiles".to_string()));
        assert!(tables.contains(&"broker_accounts".to_string()));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();

        // Second open must not re-apply migrations destructively.
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
    }
}
