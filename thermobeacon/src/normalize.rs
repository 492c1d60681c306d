//! Clean-up of raw capture lines before anything searches them.

/// Marker that starts a device record in the control shell's output, after
/// upper-casing.
pub const DEVICE_MARKER: &str = "DEVICE";

/// Strips newline, carriage-return and escape characters, upper-cases, and
/// drops the variable-length noise preceding the device record marker.
///
/// Lines without the marker are returned cleaned but whole. Applying this to
/// an already-normalized line is a no-op.
pub fn normalize(line: &str) -> String {
    let cleaned: String = line
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r' | '\u{1b}'))
        .collect();
    let cleaned = cleaned.to_uppercase();
    match cleaned.find(DEVICE_MARKER) {
        Some(start) => cleaned[start..].to_owned(),
        None => cleaned,
    }
}

/// Normalizes a whole capture.
pub fn normalize_all(lines: &[String]) -> Vec<String> {
    lines.iter().map(|line| normalize(line)).collect()
}
