//! Database lifecycle and schema migrations.

use crate::error::DatabaseError;
use crate::{Error, Result};
use sqlx::SqliteConnection;
use sqlx::sqlite::SqlitePool;
use std::path::Path;

use super::{Database, fold_case};

/// Latest schema version this build knows how to create
pub(crate) const SCHEMA_VERSION: i64 = 3;

impl Database {
    /// Create a new database connection
    ///
    /// Creates the database file if it doesn't exist and runs migrations.
    pub async fn new(path: &Path) -> Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::Database(DatabaseError::ConnectionFailed(format!(
                    "Failed to create database directory: {}",
                    e
                )))
            })?;
        }

        // Connect to database with foreign key enforcement and WAL mode
        use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
        use std::str::FromStr;

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
            .map_err(|e| {
                Error::Database(DatabaseError::ConnectionFailed(format!(
                    "Failed to parse database path: {}",
                    e
                )))
            })?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePool::connect_with(options).await.map_err(|e| {
            Error::Database(DatabaseError::ConnectionFailed(format!(
                "Failed to connect to database: {}",
                e
            )))
        })?;

        let db = Self { pool };

        db.run_migrations().await?;

        tracing::debug!(path = %path.display(), "Database ready");
        Ok(db)
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            Error::Database(DatabaseError::ConnectionFailed(format!(
                "Failed to acquire connection: {}",
                e
            )))
        })?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&mut *conn)
        .await
        .map_err(|e| migration_failed("create schema_version table", e))?;

        let current_version: Option<i64> =
            sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
                .fetch_optional(&mut *conn)
                .await
                .map_err(|e| {
                    Error::Database(DatabaseError::QueryFailed(format!(
                        "Failed to query schema version: {}",
                        e
                    )))
                })?
                .flatten();

        let current_version = current_version.unwrap_or(0);

        if current_version > SCHEMA_VERSION {
            tracing::warn!(
                found = current_version,
                supported = SCHEMA_VERSION,
                "Database schema is newer than this build"
            );
        }

        for version in (current_version + 1)..=SCHEMA_VERSION {
            Self::apply_migration(&mut conn, version).await?;
        }

        Ok(())
    }

    /// Apply one migration inside a transaction so partial failures leave the DB untouched
    async fn apply_migration(conn: &mut SqliteConnection, version: i64) -> Result<()> {
        tracing::info!(version, "Applying database migration");

        sqlx::query("BEGIN")
            .execute(&mut *conn)
            .await
            .map_err(|e| migration_failed("begin transaction", e))?;

        let result = async {
            match version {
                1 => Self::create_owners_schema(conn).await?,
                2 => Self::fold_owner_names(conn).await?,
                3 => Self::create_visits_schema(conn).await?,
                other => {
                    return Err(Error::Database(DatabaseError::MigrationFailed(format!(
                        "no migration defined for version {}",
                        other
                    ))));
                }
            }
            Self::record_migration(conn, version).await
        }
        .await;

        match result {
            Ok(()) => {
                sqlx::query("COMMIT")
                    .execute(&mut *conn)
                    .await
                    .map_err(|e| migration_failed(&format!("commit migration v{}", version), e))?;
            }
            Err(e) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                return Err(e);
            }
        }

        tracing::info!(version, "Database migration complete");
        Ok(())
    }

    /// v1: owners table and its indexes
    async fn create_owners_schema(conn: &mut SqliteConnection) -> Result<()> {
        execute_all(
            conn,
            &[
                r#"
                CREATE TABLE owners (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    first_name TEXT NOT NULL,
                    last_name TEXT NOT NULL,
                    address TEXT,
                    city TEXT,
                    telephone TEXT
                )
                "#,
                "CREATE INDEX idx_owners_last_name ON owners(last_name COLLATE NOCASE)",
                "CREATE INDEX idx_owners_telephone ON owners(telephone)",
            ],
        )
        .await
    }

    /// v2: Unicode case-folded name and city columns, plus the unique owner identity
    ///
    /// The folded values are computed here rather than with SQL `LOWER()`, which
    /// leaves non-ASCII letters untouched.
    async fn fold_owner_names(conn: &mut SqliteConnection) -> Result<()> {
        execute_all(
            conn,
            &[
                "ALTER TABLE owners ADD COLUMN first_name_lc TEXT NOT NULL DEFAULT ''",
                "ALTER TABLE owners ADD COLUMN last_name_lc TEXT NOT NULL DEFAULT ''",
                "ALTER TABLE owners ADD COLUMN city_lc TEXT",
            ],
        )
        .await?;

        let rows: Vec<(i64, String, String, Option<String>)> =
            sqlx::query_as("SELECT id, first_name, last_name, city FROM owners")
                .fetch_all(&mut *conn)
                .await
                .map_err(|e| migration_failed("read owners for case folding", e))?;

        for (id, first_name, last_name, city) in rows {
            sqlx::query(
                "UPDATE owners SET first_name_lc = ?, last_name_lc = ?, city_lc = ? WHERE id = ?",
            )
            .bind(fold_case(&first_name))
            .bind(fold_case(&last_name))
            .bind(city.as_deref().map(fold_case))
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(|e| migration_failed("backfill case-folded owner columns", e))?;
        }

        execute_all(
            conn,
            &[
                "DROP INDEX IF EXISTS idx_owners_last_name",
                "CREATE INDEX idx_owners_last_name_lc ON owners(last_name_lc)",
                // Fails if the registry already holds duplicates; those need resolving by hand
                "CREATE UNIQUE INDEX idx_owners_identity ON owners(first_name_lc, last_name_lc, telephone)",
            ],
        )
        .await
    }

    /// v3: pet types, pets and visits
    async fn create_visits_schema(conn: &mut SqliteConnection) -> Result<()> {
        execute_all(
            conn,
            &[
                r#"
                CREATE TABLE pet_types (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE
                )
                "#,
                r#"
                INSERT INTO pet_types (name)
                VALUES ('bird'), ('cat'), ('dog'), ('hamster'), ('lizard'), ('snake')
                "#,
                r#"
                CREATE TABLE pets (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    owner_id INTEGER NOT NULL REFERENCES owners(id) ON DELETE CASCADE,
                    type_id INTEGER NOT NULL REFERENCES pet_types(id),
                    name TEXT NOT NULL,
                    birth_date TEXT
                )
                "#,
                "CREATE INDEX idx_pets_owner ON pets(owner_id)",
                r#"
                CREATE TABLE visits (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    pet_id INTEGER NOT NULL REFERENCES pets(id) ON DELETE CASCADE,
                    visit_date TEXT NOT NULL,
                    description TEXT NOT NULL
                )
                "#,
                "CREATE INDEX idx_visits_date ON visits(visit_date)",
                "CREATE INDEX idx_visits_pet ON visits(pet_id)",
            ],
        )
        .await
    }

    /// Record a migration version
    async fn record_migration(conn: &mut SqliteConnection, version: i64) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query("INSERT INTO schema_version (version, applied_at) VALUES (?, ?)")
            .bind(version)
            .bind(now)
            .execute(&mut *conn)
            .await
            .map_err(|e| migration_failed("record migration", e))?;

        Ok(())
    }

    /// Current schema version recorded in the database
    pub async fn schema_version(&self) -> Result<i64> {
        let version: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Sqlx)?;
        Ok(version.unwrap_or(0))
    }

    /// Close the database connection
    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Run each DDL statement in order
async fn execute_all(conn: &mut SqliteConnection, statements: &[&str]) -> Result<()> {
    for statement in statements {
        sqlx::query(statement)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::MigrationFailed(format!(
                    "Failed to execute `{}`: {}",
                    statement.trim(),
                    e
                )))
            })?;
    }
    Ok(())
}

fn migration_failed(step: &str, e: sqlx::Error) -> Error {
    Error::Database(DatabaseError::MigrationFailed(format!(
        "Failed to {}: {}",
        step, e
    )))
}
