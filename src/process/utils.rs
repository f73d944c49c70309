/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Split a raw export line into fields, dropping the segment after the final `|`.
///
/// Every export line ends with a delimiter, so the last segment is the empty
/// tail rather than a column.
pub fn split_pod_line(line: &str) -> Vec<String> {
    let line = line.trim();
    let mut fields: Vec<String> = line.split('|').map(clean_str).collect();
    fields.pop();
    fields
}

/// Parse a coordinate column, rejecting NaN and infinities.
pub fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}
