//! Database Connection Management

mod schema;

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

pub use schema::init_schema;

/// PostgreSQL connection pool wrapper
pub struct Database {
    pub pool: PgPool,
}

impl Database {
    /// Create a new bounded connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        tracing::info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
