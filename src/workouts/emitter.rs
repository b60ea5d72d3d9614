//! Zwift workout (.zwo) file emission.
//!
//! Serializes resolved intervals into the ZWO XML document with
//! quick-xml and writes it under a week-numbered folder. The tag and
//! attribute names are a byte-exact contract with Zwift: the root is
//! the literal `workout_file`, power attributes are FTP fractions, and
//! the workout name lives in a `name` element.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::workouts::types::{EmitError, ResolvedInterval, ResolvedPower};

/// Fixed text events bracketing every workout. Fixed rather than drawn
/// from a quote pool so that regenerating a plan is byte-identical.
const WELCOME_MESSAGE: &str = "Welcome to your workout! Let's make this session amazing!";
const WELCOME_REMINDER: &str =
    "Remember: you're stronger than you think and more capable than you know!";
const CLOSING_MESSAGE: &str = "Workout complete! Your dedication is inspiring!";

/// Emit a workout file for the given date, name and resolved intervals.
///
/// Creates the week folder if absent and overwrites any existing file
/// at the same path. Returns the path written.
pub fn emit_workout(
    date: NaiveDate,
    name: &str,
    description: Option<&str>,
    intervals: &[ResolvedInterval],
    output_dir: &Path,
) -> Result<PathBuf, EmitError> {
    let path = workout_path(output_dir, date, name);
    let display_name = format!("{} {}", date.format("%m/%d"), name);
    let description = match description {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => default_description(name, date, intervals),
    };

    let document = render_document(&display_name, &description, intervals)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| EmitError::IoError(e.to_string()))?;
    }
    fs::write(&path, document).map_err(|e| EmitError::IoError(e.to_string()))?;

    tracing::info!(path = %path.display(), "wrote workout file");
    Ok(path)
}

/// Output path for a workout: `Week_<iso week>/<YYYY_MM_DD>_<name>.zwo`.
pub fn workout_path(output_dir: &Path, date: NaiveDate, name: &str) -> PathBuf {
    let week_folder = format!("Week_{}", date.iso_week().week());
    let filename = format!("{}_{}.zwo", date.format("%Y_%m_%d"), sanitize_name(name));
    output_dir.join(week_folder).join(filename)
}

/// Sanitize a workout name for use in a filename: alphanumerics, `-`
/// and `_` survive, everything else becomes `_`, spaces included.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Synthesize a description from the intervals when the plan has none.
fn default_description(name: &str, date: NaiveDate, intervals: &[ResolvedInterval]) -> String {
    let mut text = format!("{} - {}\n", name, date.format("%m/%d"));
    for interval in intervals {
        let label = interval.name.as_deref().unwrap_or("Interval");
        text.push_str(&format!(
            "\n{}: {}min @ {}",
            label,
            interval.duration_seconds / 60,
            interval.power
        ));
        if let Some(cadence) = interval.cadence {
            text.push_str(&format!(" ({}-{} RPM)", cadence.min_rpm, cadence.max_rpm));
        }
    }
    text
}

/// Render the full ZWO document as a string.
pub fn render_document(
    display_name: &str,
    description: &str,
    intervals: &[ResolvedInterval],
) -> Result<String, EmitError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| EmitError::XmlError(e.to_string()))?;

    writer
        .write_event(Event::Start(BytesStart::new("workout_file")))
        .map_err(|e| EmitError::XmlError(e.to_string()))?;

    writer
        .write_event(Event::Empty(BytesStart::new("author")))
        .map_err(|e| EmitError::XmlError(e.to_string()))?;

    write_element(&mut writer, "name", display_name)?;
    write_element(&mut writer, "description", description)?;
    write_element(&mut writer, "sportType", "bike")?;
    write_element(&mut writer, "durationType", "time")?;

    writer
        .write_event(Event::Empty(BytesStart::new("tags")))
        .map_err(|e| EmitError::XmlError(e.to_string()))?;

    writer
        .write_event(Event::Start(BytesStart::new("workout")))
        .map_err(|e| EmitError::XmlError(e.to_string()))?;

    write_textevent(&mut writer, 5, WELCOME_MESSAGE)?;
    write_textevent(&mut writer, 15, WELCOME_REMINDER)?;

    for interval in intervals {
        write_interval(&mut writer, interval)?;
    }

    write_textevent(&mut writer, 10, CLOSING_MESSAGE)?;

    writer
        .write_event(Event::End(BytesEnd::new("workout")))
        .map_err(|e| EmitError::XmlError(e.to_string()))?;

    writer
        .write_event(Event::End(BytesEnd::new("workout_file")))
        .map_err(|e| EmitError::XmlError(e.to_string()))?;

    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| EmitError::XmlError(e.to_string()))
}

/// Write one interval element: `SteadyState` for flat targets, `Ramp`
/// for ranges. A named interval gets its label as a child text event.
fn write_interval<W: std::io::Write>(
    writer: &mut Writer<W>,
    interval: &ResolvedInterval,
) -> Result<(), EmitError> {
    let (tag, mut element) = match interval.power {
        ResolvedPower::Steady { percent } => {
            let mut e = BytesStart::new("SteadyState");
            e.push_attribute(("Duration", interval.duration_seconds.to_string().as_str()));
            e.push_attribute(("Power", format_fraction(percent).as_str()));
            ("SteadyState", e)
        }
        ResolvedPower::Ramp { low, high } => {
            let mut e = BytesStart::new("Ramp");
            e.push_attribute(("Duration", interval.duration_seconds.to_string().as_str()));
            e.push_attribute(("PowerLow", format_fraction(low).as_str()));
            e.push_attribute(("PowerHigh", format_fraction(high).as_str()));
            ("Ramp", e)
        }
    };

    element.push_attribute(("pace", "0"));

    if let Some(cadence) = interval.cadence {
        let range = format!("{}-{}", cadence.min_rpm, cadence.max_rpm);
        element.push_attribute(("Cadence", range.as_str()));
    }

    match interval.name.as_deref().filter(|n| !n.is_empty()) {
        Some(label) => {
            writer
                .write_event(Event::Start(element))
                .map_err(|e| EmitError::XmlError(e.to_string()))?;
            write_textevent(writer, 10, label)?;
            writer
                .write_event(Event::End(BytesEnd::new(tag)))
                .map_err(|e| EmitError::XmlError(e.to_string()))?;
        }
        None => {
            writer
                .write_event(Event::Empty(element))
                .map_err(|e| EmitError::XmlError(e.to_string()))?;
        }
    }

    Ok(())
}

/// Format a percent-of-FTP value as the fraction Zwift expects,
/// trimmed of trailing zeros: 65 -> "0.65", 100 -> "1".
fn format_fraction(percent: f64) -> String {
    let formatted = format!("{:.3}", percent / 100.0);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &str,
) -> Result<(), EmitError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(|e| EmitError::XmlError(e.to_string()))?;

    writer
        .write_event(Event::Text(BytesText::new(value)))
        .map_err(|e| EmitError::XmlError(e.to_string()))?;

    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(|e| EmitError::XmlError(e.to_string()))?;

    Ok(())
}

fn write_textevent<W: std::io::Write>(
    writer: &mut Writer<W>,
    timeoffset: u32,
    message: &str,
) -> Result<(), EmitError> {
    let mut event = BytesStart::new("textevent");
    event.push_attribute(("timeoffset", timeoffset.to_string().as_str()));
    event.push_attribute(("message", message));
    writer
        .write_event(Event::Empty(event))
        .map_err(|e| EmitError::XmlError(e.to_string()))
}
