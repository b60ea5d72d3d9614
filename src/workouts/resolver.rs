//! Power target resolution.
//!
//! Normalizes every power target to percent-of-FTP, the only form the
//! ZWO emitter accepts. Tagged targets convert directly; untagged legacy
//! targets are classified by the threshold heuristic below.

use crate::workouts::types::{
    Interval, PowerTarget, PowerUnit, ResolveError, ResolvedInterval, ResolvedPower,
};

/// Classification threshold for untagged targets: values at or below
/// this are read as percent-of-FTP, values above as absolute watts.
///
/// The boundary matters. A 180 W recovery target misread as 180% FTP
/// once produced absurd wattage, which is why tagged targets never go
/// through this guess and why the boundary is tested explicitly.
pub const UNTAGGED_PERCENT_MAX: f64 = 200.0;

/// Untagged values within this distance of the threshold are logged as
/// ambiguous before proceeding with the best-guess classification.
const AMBIGUITY_BAND: f64 = 10.0;

/// Upper bound for a plausible percent-of-FTP value; anything above is
/// clamped and reported as a data-quality warning.
const PERCENT_MAX: f64 = 250.0;

/// Resolve one interval's power target to percent-of-FTP.
///
/// Range bounds resolve independently unless the target carries an
/// explicit unit tag, which then governs both bounds. Resolution is
/// stateless and deterministic.
pub fn resolve_interval(interval: &Interval, ftp: u16) -> Result<ResolvedInterval, ResolveError> {
    if ftp == 0 {
        return Err(ResolveError::InvalidFtp(ftp));
    }
    if interval.duration_seconds == 0 {
        return Err(ResolveError::ZeroDuration);
    }

    let power = match &interval.power_target {
        PowerTarget::Single { value, unit } => ResolvedPower::Steady {
            percent: resolve_bound(*value, *unit, ftp),
        },
        PowerTarget::Range { min, max, unit } => {
            let low = resolve_bound(*min, *unit, ftp);
            let high = resolve_bound(*max, *unit, ftp);
            if low > high {
                return Err(ResolveError::InvertedRange {
                    min: low,
                    max: high,
                });
            }
            if (high - low).abs() < f64::EPSILON {
                ResolvedPower::Steady { percent: low }
            } else {
                ResolvedPower::Ramp { low, high }
            }
        }
    };

    Ok(ResolvedInterval {
        name: interval.name.clone(),
        duration_seconds: interval.duration_seconds,
        power,
        cadence: interval.cadence_target,
    })
}

/// Resolve a single bound to percent-of-FTP.
fn resolve_bound(value: f64, unit: Option<PowerUnit>, ftp: u16) -> f64 {
    match unit {
        Some(PowerUnit::PercentFtp) => clamp_percent(value),
        Some(PowerUnit::Watts) => watts_to_percent(value, ftp),
        None => {
            if (value - UNTAGGED_PERCENT_MAX).abs() <= AMBIGUITY_BAND {
                tracing::warn!(
                    value,
                    threshold = UNTAGGED_PERCENT_MAX,
                    "untagged power target near classification threshold, guessing unit"
                );
            }
            if value <= UNTAGGED_PERCENT_MAX {
                clamp_percent(value)
            } else {
                watts_to_percent(value, ftp)
            }
        }
    }
}

fn watts_to_percent(watts: f64, ftp: u16) -> f64 {
    (100.0 * watts / f64::from(ftp)).round()
}

fn clamp_percent(value: f64) -> f64 {
    if value < 0.0 {
        tracing::warn!(value, "negative percent-of-FTP target clamped to 0");
        0.0
    } else if value > PERCENT_MAX {
        tracing::warn!(value, max = PERCENT_MAX, "implausible percent-of-FTP target clamped");
        PERCENT_MAX
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workouts::types::PowerTarget;

    fn interval(target: PowerTarget) -> Interval {
        Interval {
            name: None,
            duration_seconds: 300,
            power_target: target,
            cadence_target: None,
        }
    }

    #[test]
    fn test_watts_convert_by_formula() {
        let resolved = resolve_interval(&interval(PowerTarget::watts(180.0)), 250).unwrap();
        // round(100 * 180 / 250) = 72
        assert_eq!(resolved.power, ResolvedPower::Steady { percent: 72.0 });
    }

    #[test]
    fn test_percent_passes_through_unchanged() {
        let resolved = resolve_interval(&interval(PowerTarget::percent_ftp(65.0)), 250).unwrap();
        assert_eq!(resolved.power, ResolvedPower::Steady { percent: 65.0 });
    }

    #[test]
    fn test_untagged_at_threshold_is_percent() {
        let resolved = resolve_interval(&interval(PowerTarget::untagged(200.0)), 250).unwrap();
        assert_eq!(resolved.power, ResolvedPower::Steady { percent: 200.0 });
    }

    #[test]
    fn test_untagged_above_threshold_is_watts() {
        let resolved = resolve_interval(&interval(PowerTarget::untagged(201.0)), 250).unwrap();
        // round(100 * 201 / 250) = 80
        assert_eq!(resolved.power, ResolvedPower::Steady { percent: 80.0 });
    }

    #[test]
    fn test_tagged_watts_never_misread_as_percent() {
        // Regression guard: a 180 W target once came out as 180% FTP.
        let resolved = resolve_interval(&interval(PowerTarget::watts(180.0)), 258).unwrap();
        match resolved.power {
            ResolvedPower::Steady { percent } => {
                assert_eq!(percent, 70.0);
                assert_ne!(percent, 180.0);
            }
            _ => panic!("expected steady power"),
        }
    }

    #[test]
    fn test_implausible_percent_is_clamped() {
        let resolved = resolve_interval(&interval(PowerTarget::percent_ftp(300.0)), 250).unwrap();
        assert_eq!(resolved.power, ResolvedPower::Steady { percent: 250.0 });
    }

    #[test]
    fn test_zero_duration_rejected() {
        let mut iv = interval(PowerTarget::percent_ftp(65.0));
        iv.duration_seconds = 0;
        assert_eq!(resolve_interval(&iv, 250), Err(ResolveError::ZeroDuration));
    }

    #[test]
    fn test_zero_ftp_rejected() {
        let iv = interval(PowerTarget::watts(180.0));
        assert_eq!(resolve_interval(&iv, 0), Err(ResolveError::InvalidFtp(0)));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let iv = interval(PowerTarget::range(
            90.0,
            60.0,
            Some(PowerUnit::PercentFtp),
        ));
        assert_eq!(
            resolve_interval(&iv, 250),
            Err(ResolveError::InvertedRange {
                min: 90.0,
                max: 60.0
            })
        );
    }

    #[test]
    fn test_range_with_equal_bounds_is_steady() {
        let iv = interval(PowerTarget::range(
            65.0,
            65.0,
            Some(PowerUnit::PercentFtp),
        ));
        let resolved = resolve_interval(&iv, 250).unwrap();
        assert_eq!(resolved.power, ResolvedPower::Steady { percent: 65.0 });
    }
}
