//! Workout plan types and enums.
//!
//! A `WorkoutPlan` is the read-only input to file generation: a dated,
//! named list of intervals whose power targets may be expressed as
//! percent-of-FTP, absolute watts, or (legacy) without a unit at all.
//! Resolution normalizes everything to percent-of-FTP before emission.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unit tag for a power target value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUnit {
    /// Percentage of the rider's FTP
    PercentFtp,
    /// Absolute power in watts
    Watts,
}

/// Power target specification for one interval.
///
/// `unit: None` is the legacy untagged shape; classification then falls
/// to the threshold heuristic in the resolver. A range target carries a
/// single unit tag governing both bounds when present; untagged bounds
/// are classified independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPowerTarget", into = "RawPowerTarget")]
pub enum PowerTarget {
    /// Flat target held for the whole interval
    Single { value: f64, unit: Option<PowerUnit> },
    /// Min/max range, emitted as a ramp from min to max
    Range {
        min: f64,
        max: f64,
        unit: Option<PowerUnit>,
    },
}

impl PowerTarget {
    /// Create a percent-of-FTP target.
    pub fn percent_ftp(value: f64) -> Self {
        PowerTarget::Single {
            value,
            unit: Some(PowerUnit::PercentFtp),
        }
    }

    /// Create an absolute-watts target.
    pub fn watts(value: f64) -> Self {
        PowerTarget::Single {
            value,
            unit: Some(PowerUnit::Watts),
        }
    }

    /// Create an untagged target (legacy inputs without a unit).
    pub fn untagged(value: f64) -> Self {
        PowerTarget::Single { value, unit: None }
    }

    /// Create a range target.
    pub fn range(min: f64, max: f64, unit: Option<PowerUnit>) -> Self {
        PowerTarget::Range { min, max, unit }
    }
}

/// Wire shape for power targets as they appear in stored interval JSON.
///
/// Accepts the shapes produced by the planning tools:
/// `{"type": "percent_ftp", "value": 65}`, `{"type": "watts", "value": 180}`,
/// `{"type": "range", "min": 55, "max": 65, "unit": "watts"}`,
/// `{"min": 55, "max": 65}` and the bare legacy `{"value": 65}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawPowerTarget {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<PowerUnit>,
}

impl TryFrom<RawPowerTarget> for PowerTarget {
    type Error = String;

    fn try_from(raw: RawPowerTarget) -> Result<Self, Self::Error> {
        match raw.kind.as_deref() {
            Some("percent_ftp") => {
                let value = raw.value.ok_or("percent_ftp target missing value")?;
                Ok(PowerTarget::Single {
                    value,
                    unit: Some(PowerUnit::PercentFtp),
                })
            }
            Some("watts") => {
                let value = raw.value.ok_or("watts target missing value")?;
                Ok(PowerTarget::Single {
                    value,
                    unit: Some(PowerUnit::Watts),
                })
            }
            Some("range") => {
                let min = raw.min.ok_or("range target missing min")?;
                let max = raw.max.ok_or("range target missing max")?;
                Ok(PowerTarget::Range {
                    min,
                    max,
                    unit: raw.unit,
                })
            }
            Some(other) => Err(format!("unknown power target type: {}", other)),
            None => match (raw.min, raw.max, raw.value) {
                (Some(min), Some(max), _) => Ok(PowerTarget::Range {
                    min,
                    max,
                    unit: raw.unit,
                }),
                (_, _, Some(value)) => Ok(PowerTarget::Single {
                    value,
                    unit: raw.unit,
                }),
                _ => Err("unrecognized power target shape".to_string()),
            },
        }
    }
}

impl From<PowerTarget> for RawPowerTarget {
    fn from(target: PowerTarget) -> Self {
        match target {
            PowerTarget::Single { value, unit } => RawPowerTarget {
                kind: unit.map(|u| {
                    match u {
                        PowerUnit::PercentFtp => "percent_ftp",
                        PowerUnit::Watts => "watts",
                    }
                    .to_string()
                }),
                value: Some(value),
                min: None,
                max: None,
                unit: None,
            },
            PowerTarget::Range { min, max, unit } => RawPowerTarget {
                kind: None,
                value: None,
                min: Some(min),
                max: Some(max),
                unit,
            },
        }
    }
}

/// Cadence target specification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CadenceTarget {
    /// Minimum target cadence in RPM
    #[serde(alias = "min")]
    pub min_rpm: u8,
    /// Maximum target cadence in RPM
    #[serde(alias = "max")]
    pub max_rpm: u8,
}

/// A single timed segment of a planned workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Optional segment label ("Warmup", "VO2 #1", ...)
    #[serde(default)]
    pub name: Option<String>,
    /// Duration in seconds
    #[serde(alias = "duration")]
    pub duration_seconds: u32,
    /// Power target specification
    #[serde(alias = "powerTarget")]
    pub power_target: PowerTarget,
    /// Optional cadence target
    #[serde(default, alias = "cadenceTarget")]
    pub cadence_target: Option<CadenceTarget>,
}

/// A planned training session as stored in the plan database.
///
/// Immutable once handed to generation; each call owns its plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutPlan {
    /// Unique identifier
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Scheduled date of the session
    pub date: NaiveDate,
    /// Workout name
    pub name: String,
    /// Activity type ("bike", "run", ...); only rides generate files
    #[serde(default = "default_activity_type", alias = "type")]
    pub activity_type: String,
    /// Free-text description; synthesized from intervals when absent
    #[serde(default)]
    pub description: Option<String>,
    /// Ordered list of intervals
    #[serde(default)]
    pub intervals: Vec<Interval>,
    /// Plan-specific FTP override in watts
    #[serde(default)]
    pub ftp: Option<u16>,
    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_activity_type() -> String {
    "bike".to_string()
}

/// Resolved power expression, always percent-of-FTP.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedPower {
    /// Flat target
    Steady { percent: f64 },
    /// Ramp from `low` to `high`
    Ramp { low: f64, high: f64 },
}

impl std::fmt::Display for ResolvedPower {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvedPower::Steady { percent } => write!(f, "{:.0}% FTP", percent),
            ResolvedPower::Ramp { low, high } => write!(f, "{:.0}-{:.0}% FTP", low, high),
        }
    }
}

/// An interval whose power target has been normalized to percent-of-FTP.
///
/// This is the only form the file emitter accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedInterval {
    /// Segment label carried through from the plan
    pub name: Option<String>,
    /// Duration in seconds
    pub duration_seconds: u32,
    /// Normalized power expression
    pub power: ResolvedPower,
    /// Cadence target carried through from the plan
    pub cadence: Option<CadenceTarget>,
}

/// Errors during power target resolution.
#[derive(Debug, Error, PartialEq)]
pub enum ResolveError {
    /// Interval duration must be positive
    #[error("interval duration must be positive")]
    ZeroDuration,

    /// FTP must be positive to normalize watts
    #[error("FTP must be positive, got {0}")]
    InvalidFtp(u16),

    /// Range resolved with min above max
    #[error("resolved range is inverted: {min:.0}% > {max:.0}%")]
    InvertedRange { min: f64, max: f64 },
}

/// Errors during workout file emission.
#[derive(Debug, Error)]
pub enum EmitError {
    /// Directory creation or file write/rewrite failure
    #[error("IO error: {0}")]
    IoError(String),

    /// XML serialization failure
    #[error("XML error: {0}")]
    XmlError(String),
}

/// Errors during generation of a single workout file.
///
/// Carries the plan date and name so a batch failure can be diagnosed
/// without re-deriving state.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// A power target failed resolution
    #[error("workout '{name}' on {date}: interval {index}: {source}")]
    Resolve {
        date: NaiveDate,
        name: String,
        index: usize,
        source: ResolveError,
    },

    /// File emission or the tag repair pass failed
    #[error("workout '{name}' on {date}: {source}")]
    Emit {
        date: NaiveDate,
        name: String,
        source: EmitError,
    },

    /// Stored interval JSON could not be parsed
    #[error("workout '{name}' on {date}: invalid intervals JSON: {detail}")]
    InvalidIntervals {
        date: NaiveDate,
        name: String,
        detail: String,
    },

    /// Plan has no interval data
    #[error("workout '{name}' on {date} has no intervals")]
    NoIntervals { date: NaiveDate, name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_typed_watts_target() {
        let target: PowerTarget = serde_json::from_str(r#"{"type":"watts","value":180}"#).unwrap();
        assert_eq!(target, PowerTarget::watts(180.0));
    }

    #[test]
    fn test_parse_typed_percent_target() {
        let target: PowerTarget =
            serde_json::from_str(r#"{"type":"percent_ftp","value":65}"#).unwrap();
        assert_eq!(target, PowerTarget::percent_ftp(65.0));
    }

    #[test]
    fn test_parse_min_max_with_unit() {
        let target: PowerTarget =
            serde_json::from_str(r#"{"min":55,"max":65,"unit":"percent_ftp"}"#).unwrap();
        assert_eq!(
            target,
            PowerTarget::range(55.0, 65.0, Some(PowerUnit::PercentFtp))
        );
    }

    #[test]
    fn test_parse_bare_value_is_untagged() {
        let target: PowerTarget = serde_json::from_str(r#"{"value":65}"#).unwrap();
        assert_eq!(target, PowerTarget::untagged(65.0));
    }

    #[test]
    fn test_parse_rejects_unrecognized_shape() {
        let result: Result<PowerTarget, serde_json::Error> = serde_json::from_str(r#"{"foo":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_interval_accepts_camel_case_keys() {
        let json = r#"{
            "name": "Tempo",
            "duration": 600,
            "powerTarget": {"type": "percent_ftp", "value": 85},
            "cadenceTarget": {"min": 85, "max": 95}
        }"#;
        let interval: Interval = serde_json::from_str(json).unwrap();
        assert_eq!(interval.duration_seconds, 600);
        assert_eq!(interval.power_target, PowerTarget::percent_ftp(85.0));
        let cadence = interval.cadence_target.unwrap();
        assert_eq!(cadence.min_rpm, 85);
        assert_eq!(cadence.max_rpm, 95);
    }

    #[test]
    fn test_power_target_round_trips_through_json() {
        let targets = vec![
            PowerTarget::watts(250.0),
            PowerTarget::percent_ftp(72.0),
            PowerTarget::untagged(65.0),
            PowerTarget::range(55.0, 75.0, Some(PowerUnit::Watts)),
        ];
        for target in targets {
            let json = serde_json::to_string(&target).unwrap();
            let back: PowerTarget = serde_json::from_str(&json).unwrap();
            assert_eq!(back, target);
        }
    }
}
