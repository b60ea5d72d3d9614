//! Workout module: plan types, power resolution and file generation.

pub mod emitter;
pub mod fixer;
pub mod generator;
pub mod resolver;
pub mod types;

pub use emitter::{emit_workout, render_document, workout_path};
pub use fixer::fix_name_tag;
pub use generator::{generate_range, generate_workout, BatchReport, PlanFailure};
pub use resolver::{resolve_interval, UNTAGGED_PERCENT_MAX};
pub use types::{
    CadenceTarget, EmitError, GenerateError, Interval, PowerTarget, PowerUnit, ResolveError,
    ResolvedInterval, ResolvedPower, WorkoutPlan,
};
