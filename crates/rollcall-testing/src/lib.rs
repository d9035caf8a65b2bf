//! Test utilities for rollcall crates.
//!
//! Provides migrated SQLite databases. Import from dev-dependencies only, never from
//! production code.

use std::path::PathBuf;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use rollcall_migration::Migrator;

/// A fresh in-memory database with every migration applied.
///
/// The pool holds a single connection: each SQLite in-memory connection is its own
/// database. Panics if the schema cannot be created.
pub async fn test_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(opts)
        .await
        .expect("failed to open in-memory sqlite");
    db.execute_unprepared("PRAGMA foreign_keys = ON")
        .await
        .expect("failed to enable foreign keys");
    Migrator::up(&db, None)
        .await
        .expect("failed to apply migrations");
    tracing::debug!("test database ready");
    db
}

/// A migrated SQLite database in a temporary file, shared by a pool of
/// `max_connections` connections. The file is removed on drop.
pub struct FileTestDb {
    conn: DatabaseConnection,
    path: PathBuf,
}

impl FileTestDb {
    /// Panics if the file cannot be created or migrated.
    pub async fn open(max_connections: u32) -> Self {
        let path = std::env::temp_dir().join(format!("rollcall-test-{}.db", uuid::Uuid::now_v7()));
        let mut opts = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
        // Pooled SQLite connections enable foreign keys on connect.
        opts.max_connections(max_connections)
            .min_connections(max_connections)
            .sqlx_logging(false);
        let conn = Database::connect(opts)
            .await
            .expect("failed to open file-backed sqlite");
        Migrator::up(&conn, None)
            .await
            .expect("failed to apply migrations");
        tracing::debug!(path = %path.display(), max_connections, "file test database ready");
        Self { conn, path }
    }

    pub fn connection(&self) -> DatabaseConnection {
        self.conn.clone()
    }
}

impl Drop for FileTestDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}
