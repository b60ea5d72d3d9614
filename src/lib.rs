//! Zwogen - Zwift Workout File Generator
//!
//! Generates Zwift `.zwo` workout files from planned training sessions
//! stored in SQLite. Power targets are normalized to percent-of-FTP,
//! emitted as ZWO XML into week-numbered folders, and run through a
//! byte-level tag repair pass before the path is returned.

pub mod storage;
pub mod workouts;

// Re-export commonly used types
pub use storage::config::AppConfig;
pub use storage::database::Database;
pub use workouts::generator::{generate_range, generate_workout, BatchReport};
pub use workouts::types::{Interval, PowerTarget, WorkoutPlan};
