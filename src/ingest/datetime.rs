/// Calendar text → epoch milliseconds.
///
/// Sensor firmware is not consistent about how it writes dates: the JSON
/// logger emits RFC 3339, the rain counter appends `date(1)` output, and
/// hand-edited files tend to use `YYYY-MM-DD HH:MM:SS`, and Node-written
/// logs carry `Date.prototype.toString()` output. Text without any zone is
/// read as UTC; text with a zone abbreviation we cannot resolve is rejected.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Zone abbreviations accepted in `date(1)` output, with their UTC offset in
/// hours. Anything else makes the time underivable.
const ZONE_OFFSETS: &[(&str, i64)] = &[
    ("UTC", 0),
    ("UT", 0),
    ("GMT", 0),
    ("Z", 0),
    ("WET", 0),
    ("WEST", 1),
    ("CET", 1),
    ("CEST", 2),
    ("EST", -5),
    ("EDT", -4),
    ("CST", -6),
    ("CDT", -5),
    ("MST", -7),
    ("MDT", -6),
    ("PST", -8),
    ("PDT", -7),
];

/// Offset-bearing formats tried after RFC 3339 / RFC 2822.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%a %b %e %H:%M:%S %z %Y",
    // JavaScript Date.prototype.toString(), zone name stripped
    "%a %b %d %Y %H:%M:%S GMT%z",
];

/// Naive formats, interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    // date(1) / ctime output, day padded with a space or a zero
    "%a %b %e %H:%M:%S %Y",
    "%a %b %d %H:%M:%S %Y",
];

/// Parses a date/time string into milliseconds since the Unix epoch.
///
/// Returns `None` when no known format matches or when the instant falls
/// before the epoch.
pub fn parse_epoch_millis(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let millis = parse_any(text)?;
    (millis >= 0).then_some(millis)
}

fn parse_any(text: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.timestamp_millis());
    }
    let without_zone_name = strip_zone_name(text);
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(without_zone_name, fmt) {
            return Some(dt.timestamp_millis());
        }
    }
    if let Some(millis) = parse_naive(text) {
        return Some(millis);
    }

    // `date(1)` output carries a zone abbreviation ("Mon Jan  1 00:00:00 PST 2024")
    // that chrono cannot resolve itself.
    if let Some((stripped, zone)) = split_zone_abbreviation(text) {
        let offset_hours = zone_offset_hours(zone)?;
        return parse_naive(&stripped).map(|millis| millis - offset_hours * 3_600_000);
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis());
    }

    // Bare epoch milliseconds (13 digits until 2286)
    if text.len() == 13 && text.bytes().all(|b| b.is_ascii_digit()) {
        return text.parse::<i64>().ok();
    }

    None
}

fn parse_naive(text: &str) -> Option<i64> {
    NAIVE_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(text, fmt)
            .ok()
            .map(|dt| dt.and_utc().timestamp_millis())
    })
}

/// Drops a trailing parenthesised zone name, as in
/// `... GMT+0100 (Central European Standard Time)`.
fn strip_zone_name(text: &str) -> &str {
    match text.rfind(" (") {
        Some(idx) if text.ends_with(')') => text[..idx].trim_end(),
        _ => text,
    }
}

/// Splits off the all-uppercase alphabetic token (e.g. `CET`, `UTC`) sitting
/// between the time and the year.
fn split_zone_abbreviation(text: &str) -> Option<(String, &str)> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < 3 {
        return None;
    }
    let zone_idx = tokens.len() - 2;
    let zone = tokens[zone_idx];
    if !zone.chars().all(|c| c.is_ascii_uppercase()) {
        return None;
    }

    let kept: Vec<&str> = tokens
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != zone_idx)
        .map(|(_, t)| *t)
        .collect();
    Some((kept.join(" "), zone))
}

fn zone_offset_hours(zone: &str) -> Option<i64> {
    ZONE_OFFSETS
        .iter()
        .find(|(name, _)| *name == zone)
        .map(|(_, hours)| *hours)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEW_YEAR_2024: i64 = 1_704_067_200_000;

    #[test]
    fn test_rfc3339_utc() {
        assert_eq!(parse_epoch_millis("2024-01-01T00:00:00Z"), Some(NEW_YEAR_2024));
    }

    #[test]
    fn test_rfc3339_with_offset_and_fraction() {
        assert_eq!(
            parse_epoch_millis("2024-01-01T01:00:00.250+01:00"),
            Some(NEW_YEAR_2024 + 250)
        );
    }

    #[test]
    fn test_naive_space_separated_is_utc() {
        assert_eq!(parse_epoch_millis("2024-01-01 00:00:00"), Some(NEW_YEAR_2024));
    }

    #[test]
    fn test_date_only_is_utc_midnight() {
        assert_eq!(parse_epoch_millis("2024-01-01"), Some(NEW_YEAR_2024));
    }

    #[test]
    fn test_date_command_output() {
        assert_eq!(parse_epoch_millis("Mon Jan  1 00:00:00 2024"), Some(NEW_YEAR_2024));
        assert_eq!(parse_epoch_millis("Mon Jan  1 00:00:00 UTC 2024"), Some(NEW_YEAR_2024));
    }

    #[test]
    fn test_date_command_zone_abbreviation_is_applied() {
        let tip = NEW_YEAR_2024 + 90_000;
        assert_eq!(parse_epoch_millis("Sun Dec 31 16:01:30 PST 2023"), Some(tip));
        assert_eq!(parse_epoch_millis("Sun Dec 31 17:01:30 PDT 2023"), Some(tip));
        assert_eq!(parse_epoch_millis("Mon Jan  1 02:01:30 CEST 2024"), Some(tip));
        assert_eq!(parse_epoch_millis("Sun Dec 31 19:01:30 EST 2023"), Some(tip));
    }

    #[test]
    fn test_unknown_zone_abbreviation_is_rejected() {
        assert_eq!(parse_epoch_millis("Mon Jan  1 00:01:30 XYZ 2024"), None);
        assert_eq!(parse_epoch_millis("Mon Jan  1 00:01:30 IST 2024"), None);
    }

    #[test]
    fn test_javascript_date_string() {
        assert_eq!(
            parse_epoch_millis("Mon Jan 01 2024 01:01:30 GMT+0100 (Central European Standard Time)"),
            Some(NEW_YEAR_2024 + 90_000)
        );
        assert_eq!(
            parse_epoch_millis("Sun Dec 31 2023 16:01:30 GMT-0800"),
            Some(NEW_YEAR_2024 + 90_000)
        );
    }

    #[test]
    fn test_rfc2822() {
        assert_eq!(
            parse_epoch_millis("Mon, 01 Jan 2024 00:00:00 +0000"),
            Some(NEW_YEAR_2024)
        );
    }

    #[test]
    fn test_epoch_millis_passthrough() {
        assert_eq!(parse_epoch_millis("1704067200000"), Some(NEW_YEAR_2024));
    }

    #[test]
    fn test_compact_digit_dates_are_not_epoch_millis() {
        assert_eq!(parse_epoch_millis("2024010112"), None);
        assert_eq!(parse_epoch_millis("20240101120000"), None);
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(parse_epoch_millis("  2024-01-01T00:00:00Z\r\n"), Some(NEW_YEAR_2024));
    }

    #[test]
    fn test_garbage_and_empty_are_rejected() {
        assert_eq!(parse_epoch_millis(""), None);
        assert_eq!(parse_epoch_millis("not a date"), None);
        assert_eq!(parse_epoch_millis("2024-13-45T99:00:00Z"), None);
    }

    #[test]
    fn test_pre_epoch_is_rejected() {
        assert_eq!(parse_epoch_millis("1969-12-31T23:59:59Z"), None);
    }
}
