//! Plan store operations using rusqlite.
//!
//! A thin read-mostly layer: plans are inserted on import and queried
//! by date range for batch generation. Intervals are stored as a JSON
//! column; rows with malformed JSON surface as per-plan failures at
//! generation time, never as batch aborts.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Result as SqliteResult};
use thiserror::Error;
use uuid::Uuid;

use crate::storage::schema::{CURRENT_VERSION, SCHEMA, SCHEMA_VERSION_TABLE};
use crate::workouts::types::{Interval, WorkoutPlan};

/// Database wrapper for SQLite operations.
pub struct Database {
    conn: Connection,
}

/// A planned workout row as read from the store, intervals still JSON.
#[derive(Debug)]
pub struct PlanRecord {
    pub id: Uuid,
    pub date: NaiveDate,
    pub name: String,
    pub activity_type: String,
    pub description: Option<String>,
    pub intervals_json: Option<String>,
    pub ftp: Option<u16>,
    pub created_at: DateTime<Utc>,
}

impl PlanRecord {
    /// Parse the stored intervals JSON and build the full plan.
    pub fn into_plan(self) -> Result<WorkoutPlan, String> {
        let intervals: Vec<Interval> = match self.intervals_json.as_deref() {
            Some(json) if !json.is_empty() => {
                serde_json::from_str(json).map_err(|e| e.to_string())?
            }
            _ => Vec::new(),
        };

        Ok(WorkoutPlan {
            id: self.id,
            date: self.date,
            name: self.name,
            activity_type: self.activity_type,
            description: self.description,
            intervals,
            ftp: self.ftp,
            created_at: self.created_at,
        })
    }
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: &PathBuf) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::IoError(e.to_string()))?;
        }

        let conn =
            Connection::open(path).map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Initialize the database schema.
    fn initialize(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(SCHEMA_VERSION_TABLE)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        let current_version = self.get_schema_version()?;

        if current_version < CURRENT_VERSION {
            self.migrate(current_version)?;
        }

        Ok(())
    }

    /// Get the current schema version.
    fn get_schema_version(&self) -> Result<i32, DatabaseError> {
        let result: SqliteResult<i32> = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        );

        match result {
            Ok(version) => Ok(version),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Run database migrations.
    fn migrate(&self, from_version: i32) -> Result<(), DatabaseError> {
        if from_version < 1 {
            self.conn
                .execute_batch(SCHEMA)
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

            self.conn
                .execute(
                    "INSERT INTO schema_version (version, applied_at) VALUES (?, datetime('now'))",
                    [CURRENT_VERSION],
                )
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

            tracing::info!("Database migrated to version {}", CURRENT_VERSION);
        }

        Ok(())
    }

    /// Insert or replace a planned workout. Import is idempotent: a
    /// re-imported plan overwrites the row with the same id.
    pub fn insert_plan(&self, plan: &WorkoutPlan) -> Result<(), DatabaseError> {
        let intervals_json = if plan.intervals.is_empty() {
            None
        } else {
            Some(
                serde_json::to_string(&plan.intervals)
                    .map_err(|e| DatabaseError::SerializationError(e.to_string()))?,
            )
        };

        self.conn
            .execute(
                "INSERT OR REPLACE INTO planned_workouts
                 (id, date, activity_type, name, description, intervals_json, ftp, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    plan.id.to_string(),
                    plan.date.format("%Y-%m-%d").to_string(),
                    plan.activity_type,
                    plan.name,
                    plan.description,
                    intervals_json,
                    plan.ftp,
                    plan.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    /// All ride plans with `date` in `[start, end]`, ordered by date.
    pub fn plans_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PlanRecord>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, date, activity_type, name, description, intervals_json, ftp, created_at
                 FROM planned_workouts
                 WHERE activity_type = 'bike' AND date BETWEEN ?1 AND ?2
                 ORDER BY date, name",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(
                params![
                    start.format("%Y-%m-%d").to_string(),
                    end.format("%Y-%m-%d").to_string()
                ],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, Option<String>>(5)?,
                        row.get::<_, Option<u16>>(6)?,
                        row.get::<_, String>(7)?,
                    ))
                },
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut records = Vec::new();
        for row in rows {
            let (id, date, activity_type, name, description, intervals_json, ftp, created_at) =
                row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

            let id = Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;
            let created_at = DateTime::parse_from_rfc3339(&created_at)
                .map_err(|e| DatabaseError::SerializationError(e.to_string()))?
                .with_timezone(&Utc);

            records.push(PlanRecord {
                id,
                date,
                name,
                activity_type,
                description,
                intervals_json,
                ftp,
                created_at,
            });
        }

        Ok(records)
    }
}

/// Database errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(String),
}
