//! Shared SQLite fixture for the integration tests.

use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use pushkind_common::db::{DbPool, establish_connection_pool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Migrated database file that is removed together with its WAL files on drop.
pub struct TestDb {
    filename: String,
    pool: DbPool,
}

impl TestDb {
    pub fn new(filename: &str) -> Self {
        std::fs::remove_file(filename).ok();

        let pool = establish_connection_pool(filename).expect("open test database");
        let mut conn = pool.get().expect("get test connection");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("run migrations");
        TestDb {
            filename: filename.to_string(),
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        for suffix in ["", "-shm", "-wal"] {
            std::fs::remove_file(format!("{}{suffix}", self.filename)).ok();
        }
    }
}
