//! SQLite schema definitions for the plan store.

/// Current schema version.
pub const CURRENT_VERSION: i32 = 1;

/// Schema version tracking table.
pub const SCHEMA_VERSION_TABLE: &str = "
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
";

/// Initial schema: planned workouts with intervals stored as JSON.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS planned_workouts (
    id TEXT PRIMARY KEY,
    date TEXT NOT NULL,
    activity_type TEXT NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    intervals_json TEXT,
    ftp INTEGER,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_planned_workouts_date ON planned_workouts(date);
";
