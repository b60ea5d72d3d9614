//! Post-write tag repair for generated workout files.
//!
//! Earlier generations of the file emitter could not reliably produce
//! the literal `name` tag Zwift requires and wrote `<n>` instead. The
//! repair pass re-reads the file as raw bytes, substitutes the exact
//! malformed tokens, and rewrites the file. The quick-xml writer emits
//! the correct tag directly, but the pass stays in the pipeline as a
//! fallback since the original collision was never root-caused.

use std::fs;
use std::path::Path;

use crate::workouts::types::EmitError;

const MALFORMED_OPEN: &[u8] = b"<n>";
const MALFORMED_CLOSE: &[u8] = b"</n>";

/// Replace every malformed name tag in the file, rewriting it in place.
///
/// Returns the number of substitutions made. Failure to reopen or
/// rewrite the file fails the generation call; there is no partial
/// write recovery.
pub fn fix_name_tag(path: &Path) -> Result<usize, EmitError> {
    let content = fs::read(path).map_err(|e| EmitError::IoError(e.to_string()))?;

    let (content, opens) = replace_all(&content, MALFORMED_OPEN, b"<name>");
    let (content, closes) = replace_all(&content, MALFORMED_CLOSE, b"</name>");
    let replaced = opens + closes;

    if replaced > 0 {
        tracing::warn!(
            path = %path.display(),
            replaced,
            "repaired malformed name tags in workout file"
        );
    }

    fs::write(path, &content).map_err(|e| EmitError::IoError(e.to_string()))?;

    Ok(replaced)
}

/// Replace every occurrence of `needle` in `haystack`, returning the
/// new buffer and the occurrence count.
fn replace_all(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> (Vec<u8>, usize) {
    let mut out = Vec::with_capacity(haystack.len());
    let mut count = 0;
    let mut i = 0;

    while i < haystack.len() {
        if haystack[i..].starts_with(needle) {
            out.extend_from_slice(replacement);
            i += needle.len();
            count += 1;
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }

    (out, count)
}
