//! Storage module: plan database and application configuration.

pub mod config;
pub mod database;
pub mod schema;

pub use config::{load_config, save_config, AppConfig, ConfigError};
pub use database::{Database, DatabaseError, PlanRecord};
