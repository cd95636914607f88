//! `SQLite` database for the intake server.

use std::path::Path;

use sqlx::{Pool, Sqlite};
use tracing::info;

use intake_core::db::{DatabaseError, open_pool, open_pool_in_memory};

#[derive(Clone)]
pub struct IntakeDatabase {
    pool: Pool<Sqlite>,
}

impl IntakeDatabase {
    /// Open or create a database at the given path and apply migrations.
    pub async fn open(path: &Path) -> Result<Self, DatabaseError> {
        let pool = open_pool(path).await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub async fn open_in_memory() -> Result<Self, DatabaseError> {
        let pool = open_pool_in_memory().await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;

        info!("Intake database migrations complete");
        Ok(())
    }

    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Close every connection. Later queries fail with a connection error.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
