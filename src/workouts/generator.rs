//! Workout file generation: single plan and date-range batch.
//!
//! Generation runs resolve -> emit -> tag repair for each plan. Batch
//! generation isolates per-plan failures so one bad plan never aborts
//! the rest of the range.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::storage::database::{Database, DatabaseError};
use crate::workouts::emitter::emit_workout;
use crate::workouts::fixer::fix_name_tag;
use crate::workouts::resolver::resolve_interval;
use crate::workouts::types::{GenerateError, ResolvedInterval, WorkoutPlan};

/// A per-plan failure recorded during batch generation.
#[derive(Debug)]
pub struct PlanFailure {
    /// Scheduled date of the failing plan
    pub date: NaiveDate,
    /// Name of the failing plan
    pub name: String,
    /// What went wrong
    pub error: GenerateError,
}

/// Outcome of a batch generation run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Paths of successfully written files, in plan-date order
    pub written: Vec<PathBuf>,
    /// Plans that failed resolution or emission
    pub failures: Vec<PlanFailure>,
}

/// Generate one workout file for a plan.
///
/// The plan's own FTP takes precedence over `default_ftp`. Re-running
/// with the same inputs overwrites the prior file with identical bytes.
pub fn generate_workout(
    plan: &WorkoutPlan,
    default_ftp: u16,
    output_dir: &Path,
) -> Result<PathBuf, GenerateError> {
    if plan.intervals.is_empty() {
        return Err(GenerateError::NoIntervals {
            date: plan.date,
            name: plan.name.clone(),
        });
    }

    let ftp = plan.ftp.unwrap_or(default_ftp);
    tracing::debug!(
        name = %plan.name,
        date = %plan.date,
        ftp,
        intervals = plan.intervals.len(),
        "generating workout file"
    );

    let mut resolved: Vec<ResolvedInterval> = Vec::with_capacity(plan.intervals.len());
    for (index, interval) in plan.intervals.iter().enumerate() {
        let interval = resolve_interval(interval, ftp).map_err(|source| GenerateError::Resolve {
            date: plan.date,
            name: plan.name.clone(),
            index,
            source,
        })?;
        resolved.push(interval);
    }

    let path = emit_workout(
        plan.date,
        &plan.name,
        plan.description.as_deref(),
        &resolved,
        output_dir,
    )
    .map_err(|source| GenerateError::Emit {
        date: plan.date,
        name: plan.name.clone(),
        source,
    })?;

    fix_name_tag(&path).map_err(|source| GenerateError::Emit {
        date: plan.date,
        name: plan.name.clone(),
        source,
    })?;

    Ok(path)
}

/// Generate workout files for every stored ride plan in `[start, end]`.
///
/// Plans without interval data are skipped; plans that fail resolution
/// or emission are recorded in the report and do not abort the batch.
pub fn generate_range(
    db: &Database,
    start: NaiveDate,
    end: NaiveDate,
    default_ftp: u16,
    output_dir: &Path,
) -> Result<BatchReport, DatabaseError> {
    let records = db.plans_in_range(start, end)?;
    tracing::info!(
        %start,
        %end,
        plans = records.len(),
        "generating workout files for date range"
    );

    let mut report = BatchReport::default();

    for record in records {
        let date = record.date;
        let name = record.name.clone();

        let plan = match record.into_plan() {
            Ok(plan) => plan,
            Err(detail) => {
                tracing::error!(%date, %name, %detail, "skipping plan with malformed intervals");
                report.failures.push(PlanFailure {
                    date,
                    name: name.clone(),
                    error: GenerateError::InvalidIntervals { date, name, detail },
                });
                continue;
            }
        };

        if plan.intervals.is_empty() {
            tracing::warn!(%date, name = %plan.name, "plan has no intervals, skipping");
            continue;
        }

        match generate_workout(&plan, default_ftp, output_dir) {
            Ok(path) => report.written.push(path),
            Err(error) => {
                tracing::error!(%error, "workout generation failed");
                report.failures.push(PlanFailure {
                    date: plan.date,
                    name: plan.name.clone(),
                    error,
                });
            }
        }
    }

    tracing::info!(
        written = report.written.len(),
        failed = report.failures.len(),
        "batch generation complete"
    );

    Ok(report)
}
