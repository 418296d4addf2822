//! SQLite connection lifecycle and schema.
//!
//! Every operation opens its own connection through [`Database::open`] and
//! closes it before returning. No pooling.

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::config::DatabaseConfig;

const CREATE_CUSTOMERS: &str = r#"
    CREATE TABLE IF NOT EXISTS customers (
        customer_id TEXT PRIMARY KEY,
        region TEXT,
        plan TEXT,
        tenure_months INTEGER,
        employees INTEGER
    )
"#;

const CREATE_TICKETS: &str = r#"
    CREATE TABLE IF NOT EXISTS tickets (
        ticket_id TEXT PRIMARY KEY,
        customer_id TEXT,
        created_at TEXT,
        category TEXT,
        channel TEXT,
        priority TEXT,
        first_response_time_hours REAL,
        resolution_time_hours REAL,
        is_open INTEGER,
        breached_sla INTEGER,
        summary TEXT,
        FOREIGN KEY (customer_id) REFERENCES customers (customer_id)
    )
"#;

#[derive(Debug, Clone)]
pub struct Database {
    options: SqliteConnectOptions,
}

impl Database {
    pub fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(&config.url)?;
        Ok(Self::with_options(options))
    }

    pub fn from_path(path: &Path) -> Self {
        Self::with_options(SqliteConnectOptions::new().filename(path))
    }

    fn with_options(options: SqliteConnectOptions) -> Self {
        // Orphaned tickets are legal data; the declared FK must stay unenforced.
        let options = options
            .create_if_missing(true)
            .foreign_keys(false)
            .disable_statement_logging();
        Self { options }
    }

    /// Open a fresh connection. The caller owns it and must `close()` it.
    pub async fn open(&self) -> Result<SqliteConnection, sqlx::Error> {
        debug!(
            "Opening SQLite connection to {:?}",
            self.options.get_filename()
        );
        self.options.connect().await
    }

    /// Create `customers` and `tickets` if absent. Idempotent.
    pub async fn initialize_schema(&self) -> Result<(), sqlx::Error> {
        let mut conn = self.open().await?;
        create_tables(&mut conn).await?;
        conn.close().await
    }

    /// Round-trip a trivial query, used by the readiness probe.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        let mut conn = self.open().await?;
        sqlx::query("SELECT 1").execute(&mut conn).await?;
        conn.close().await
    }
}

pub async fn create_tables(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_CUSTOMERS).execute(&mut *conn).await?;
    sqlx::query(CREATE_TICKETS).execute(&mut *conn).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_schema_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::from_path(&dir.path().join("tickets.db"));

        db.initialize_schema().await.unwrap();
        db.initialize_schema().await.unwrap();

        let mut conn = db.open().await.unwrap();
        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&mut conn)
        .await
        .unwrap();
        conn.close().await.unwrap();

        assert_eq!(tables, vec!["customers".to_string(), "tickets".to_string()]);
    }

    #[tokio::test]
    async fn test_url_config_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("from_url.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", path.display()),
        };

        let db = Database::new(&config).unwrap();
        db.ping().await.unwrap();
        assert!(path.exists());
    }
}
