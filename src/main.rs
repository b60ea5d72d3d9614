//! Zwogen - Zwift Workout File Generator
//!
//! CLI entry point: import workout plans into the store and generate
//! .zwo files for a date range.

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use zwogen::storage::config::load_config;
use zwogen::storage::database::Database;
use zwogen::workouts::generator::generate_range;
use zwogen::workouts::types::WorkoutPlan;

#[derive(Parser)]
#[command(
    name = "zwogen",
    version,
    about = "Generate Zwift workout files from planned training sessions"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate .zwo files for all planned rides in a date range
    Generate {
        /// Start date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        start: NaiveDate,
        /// End date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        end: NaiveDate,
        /// FTP in watts (defaults to the configured value)
        #[arg(long)]
        ftp: Option<u16>,
        /// Base output directory for week folders
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Path to the plan database
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Import workout plans from a JSON file into the plan store
    Import {
        /// JSON file containing an array of workout plans
        file: PathBuf,
        /// Path to the plan database
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config().context("failed to load configuration")?;
    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            start,
            end,
            ftp,
            output_dir,
            db,
        } => {
            let db_path = db.unwrap_or_else(|| config.database_path.clone());
            let db = Database::open(&db_path)
                .with_context(|| format!("failed to open plan store at {}", db_path.display()))?;

            let ftp = ftp.unwrap_or(config.default_ftp);
            let output_dir = output_dir.unwrap_or_else(|| config.output_dir.clone());

            let report = generate_range(&db, start, end, ftp, &output_dir)
                .context("batch generation failed")?;

            for path in &report.written {
                println!("{}", path.display());
            }
            for failure in &report.failures {
                tracing::error!(
                    date = %failure.date,
                    name = %failure.name,
                    error = %failure.error,
                    "plan failed"
                );
            }
            tracing::info!(
                written = report.written.len(),
                failed = report.failures.len(),
                "done"
            );
        }
        Command::Import { file, db } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let plans: Vec<WorkoutPlan> =
                serde_json::from_str(&content).context("failed to parse plan JSON")?;

            let db_path = db.unwrap_or_else(|| config.database_path.clone());
            let db = Database::open(&db_path)
                .with_context(|| format!("failed to open plan store at {}", db_path.display()))?;

            for plan in &plans {
                db.insert_plan(plan)
                    .with_context(|| format!("failed to store plan '{}'", plan.name))?;
            }
            tracing::info!(count = plans.len(), "imported workout plans");
        }
    }

    Ok(())
}
