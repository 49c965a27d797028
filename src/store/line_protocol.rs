//! InfluxDB line protocol rendering
//!
//! Format: measurement,tag1=value1,tag2=value2 field1=value1,field2=value2 timestamp
//!
//! Example: temperature,desc=Air\ temperature,unit=C value=18.5 1704067200000
//!
//! Tags and fields are emitted in key order. Timestamps are epoch
//! milliseconds, so every write must carry `precision=ms`.

use crate::model::{CanonicalPoint, FieldValue};

/// Renders one point as a single line (no trailing newline).
///
/// Tags with an empty value are omitted; line protocol has no way to
/// express them.
pub fn render(point: &CanonicalPoint) -> String {
    let mut line = escape_measurement(point.measurement());

    for (key, value) in point.tags() {
        if value.is_empty() {
            continue;
        }
        line.push(',');
        line.push_str(&escape_key(key));
        line.push('=');
        line.push_str(&escape_key(value));
    }

    line.push(' ');
    let fields: Vec<String> = point
        .fields()
        .iter()
        .map(|(key, value)| format!("{}={}", escape_key(key), render_field(value)))
        .collect();
    line.push_str(&fields.join(","));

    line.push(' ');
    line.push_str(&point.timestamp().to_string());

    line
}

/// Unsuffixed numbers are floats in line protocol, so `21.0` may render as
/// `21` without changing the stored type.
fn render_field(value: &FieldValue) -> String {
    match value {
        FieldValue::Float(v) => format!("{}", v),
        FieldValue::Boolean(b) => format!("{}", b),
    }
}

/// Escape special characters in measurement names
fn escape_measurement(s: &str) -> String {
    flatten(s).replace(',', "\\,").replace(' ', "\\ ")
}

/// Escape special characters in tag keys, tag values and field keys
fn escape_key(s: &str) -> String {
    flatten(s)
        .replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

/// Doubles backslashes and turns line breaks into spaces; a newline would
/// end the line and a trailing backslash would escape the separator.
fn flatten(s: &str) -> String {
    s.replace('\\', "\\\\").replace(['\n', '\r'], " ")
}
