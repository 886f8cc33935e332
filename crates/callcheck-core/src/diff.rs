//! One-line human-readable renderings of expectation mismatches.
//!
//! These strings go straight into `FAIL <name>: <diff>` console lines and
//! into structured reports, so they stay short and self-contained.

use crate::value::Value;

/// Bytes shown in full before the rendering switches to a window around
/// the first differing offset.
const FULL_RENDER_LIMIT: usize = 16;
const WINDOW_BYTES: usize = 8;

/// Render a return-value mismatch.
#[must_use]
pub fn render_value_diff(expected: Value, actual: Value) -> String {
    format!("ret: expected {expected}, got {actual}")
}

/// Render a buffer side-effect mismatch for the buffer argument at `arg`.
///
/// Short buffers are shown whole; longer ones show a window starting at
/// the first differing offset.
#[must_use]
pub fn render_buffer_diff(arg: usize, expected: &[u8], actual: &[u8]) -> String {
    if expected.len() != actual.len() {
        return format!(
            "buf[{arg}]: expected {} bytes, got {}",
            expected.len(),
            actual.len()
        );
    }
    let Some(off) = first_mismatch(expected, actual) else {
        return format!("buf[{arg}]: contents equal");
    };
    if expected.len() <= FULL_RENDER_LIMIT {
        format!(
            "buf[{arg}]: mismatch at offset {off}: expected [{}], got [{}]",
            render_bytes(expected),
            render_bytes(actual)
        )
    } else {
        let end = (off + WINDOW_BYTES).min(expected.len());
        format!(
            "buf[{arg}]: mismatch at offset {off}: expected [..{}..], got [..{}..]",
            render_bytes(&expected[off..end]),
            render_bytes(&actual[off..end])
        )
    }
}

/// Offset of the first differing byte, or `None` when the slices agree.
#[must_use]
pub fn first_mismatch(expected: &[u8], actual: &[u8]) -> Option<usize> {
    expected
        .iter()
        .zip(actual.iter())
        .position(|(e, a)| e != a)
        .or_else(|| (expected.len() != actual.len()).then(|| expected.len().min(actual.len())))
}

/// Lowercase hex plus a printable-ASCII gloss: `61 62 63 |abc|`.
fn render_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3 + bytes.len() + 2);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{b:02x}"));
    }
    out.push_str(" |");
    for &b in bytes {
        out.push(if (0x20..0x7f).contains(&b) { b as char } else { '.' });
    }
    out.push('|');
    out
}
