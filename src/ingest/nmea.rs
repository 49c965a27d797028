/// NMEA-0183 GPS sentence parser.
///
/// The GPS receiver dumps raw sentences, one per line, interleaving fix
/// sentences with satellite and DOP reports. Only sentences that carry a
/// date, a time, a validity flag and a position can become a point, which in
/// practice means RMC ("recommended minimum") from any talker:
///
/// ```text
/// $GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A
///        time   st lat        lon         speed course date
/// ```
///
/// Every other line, including corrupt ones, is skipped.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::ParseReport;
use super::numbered_lines;
use crate::model::{CanonicalPoint, FieldValue};

pub const COORDINATE_MEASUREMENT: &str = "coordinate";

/// A decoded RMC fix.
#[derive(Debug, Clone, PartialEq)]
pub struct GpsFix {
    /// Epoch milliseconds (UTC).
    pub timestamp: i64,
    /// Receiver status `A` (active) vs `V` (void).
    pub valid: bool,
    pub latitude: f64,
    pub longitude: f64,
}

/// Parses raw NMEA text into one `coordinate` point per valid fix.
///
/// Never fails: empty input yields an empty report and every malformed or
/// non-fix line is recorded as skipped.
pub fn parse_nmea(text: &str) -> ParseReport {
    let mut report = ParseReport::default();

    for (line_no, line) in numbered_lines(text) {
        match parse_sentence(line).and_then(fix_to_point) {
            Ok(point) => report.points.push(point),
            Err(reason) => report.skip(line_no, reason),
        }
    }

    report
}

fn fix_to_point(fix: GpsFix) -> Result<CanonicalPoint, String> {
    let mut tags = BTreeMap::new();
    tags.insert("latitude".to_string(), format_degrees(fix.latitude));
    tags.insert("longitude".to_string(), format_degrees(fix.longitude));

    CanonicalPoint::with_value(
        COORDINATE_MEASUREMENT,
        tags,
        FieldValue::Boolean(fix.valid),
        fix.timestamp,
    )
    .map_err(|e| e.to_string())
}

/// Parses one sentence into a fix.
///
/// # Errors
/// A human-readable reason when the line is not a checksum-valid sentence,
/// is not an RMC sentence, or lacks time/date/position.
pub fn parse_sentence(line: &str) -> Result<GpsFix, String> {
    let line = line.trim();
    let body = line
        .strip_prefix('$')
        .ok_or_else(|| format!("not an NMEA sentence: '{}'", line))?;

    let body = match body.split_once('*') {
        Some((data, checksum)) => {
            verify_checksum(data, checksum)?;
            data
        }
        None => body,
    };

    let fields: Vec<&str> = body.split(',').collect();
    let sentence_id = fields[0];
    if sentence_id.len() != 5 || !sentence_id.ends_with("RMC") {
        return Err(format!("{} sentence carries no dated fix", sentence_id));
    }
    if fields.len() < 10 {
        return Err(format!("truncated RMC sentence ({} fields)", fields.len()));
    }

    let valid = match fields[2] {
        "A" => true,
        "V" => false,
        other => return Err(format!("unknown RMC status '{}'", other)),
    };

    let latitude = parse_coordinate(fields[3], fields[4], 2, ('N', 'S'), 90.0)?;
    let longitude = parse_coordinate(fields[5], fields[6], 3, ('E', 'W'), 180.0)?;
    let timestamp = parse_fix_time(fields[1], fields[9])?;

    Ok(GpsFix {
        timestamp,
        valid,
        latitude,
        longitude,
    })
}

fn verify_checksum(data: &str, checksum: &str) -> Result<(), String> {
    let expected = u8::from_str_radix(checksum.trim(), 16)
        .map_err(|_| format!("invalid checksum '{}'", checksum))?;
    let actual = data.bytes().fold(0u8, |acc, b| acc ^ b);
    if actual != expected {
        return Err(format!(
            "checksum mismatch: expected {:02X}, computed {:02X}",
            expected, actual
        ));
    }
    Ok(())
}

/// Converts `ddmm.mmmm` / `dddmm.mmmm` plus hemisphere into signed decimal
/// degrees.
fn parse_coordinate(
    value: &str,
    hemisphere: &str,
    degree_digits: usize,
    (positive, negative): (char, char),
    limit: f64,
) -> Result<f64, String> {
    if value.is_empty() || hemisphere.is_empty() {
        return Err("sentence has no position".to_string());
    }
    if !value.is_ascii() {
        return Err(format!("malformed coordinate '{}'", value));
    }
    let dot = value.find('.').unwrap_or(value.len());
    if dot != degree_digits + 2 {
        return Err(format!("malformed coordinate '{}'", value));
    }

    let degrees: f64 = value[..degree_digits]
        .parse()
        .map_err(|_| format!("malformed coordinate '{}'", value))?;
    let minutes: f64 = value[degree_digits..]
        .parse()
        .map_err(|_| format!("malformed coordinate '{}'", value))?;
    if minutes >= 60.0 {
        return Err(format!("coordinate minutes out of range in '{}'", value));
    }

    let magnitude = degrees + minutes / 60.0;
    if magnitude > limit {
        return Err(format!("coordinate '{}' out of range", value));
    }

    let sign = match hemisphere.chars().next() {
        Some(c) if c == positive => 1.0,
        Some(c) if c == negative => -1.0,
        _ => return Err(format!("unknown hemisphere '{}'", hemisphere)),
    };

    Ok(sign * magnitude)
}

/// Combines RMC `hhmmss[.sss]` and `ddmmyy` into UTC epoch milliseconds.
///
/// Two-digit years follow the usual GPS convention: 80–99 → 19xx,
/// 00–79 → 20xx.
fn parse_fix_time(time: &str, date: &str) -> Result<i64, String> {
    if time.len() < 6 || date.len() != 6 || !time.is_ascii() || !date.is_ascii() {
        return Err("sentence has no date/time".to_string());
    }

    let num = |s: &str| -> Result<u32, String> {
        s.parse::<u32>()
            .map_err(|_| format!("malformed date/time '{} {}'", date, time))
    };

    let hour = num(&time[0..2])?;
    let minute = num(&time[2..4])?;
    let second = num(&time[4..6])?;
    let millis = match time[6..].strip_prefix('.') {
        Some(frac) if !frac.is_empty() => {
            let frac: f64 = format!("0.{}", frac)
                .parse()
                .map_err(|_| format!("malformed time '{}'", time))?;
            (frac * 1000.0).round().min(999.0) as u32
        }
        _ if time.len() == 6 => 0,
        _ => return Err(format!("malformed time '{}'", time)),
    };

    let day = num(&date[0..2])?;
    let month = num(&date[2..4])?;
    let yy = num(&date[4..6])? as i32;
    let year = if yy >= 80 { 1900 + yy } else { 2000 + yy };

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_milli_opt(hour, minute, second, millis))
        .map(|dt| dt.and_utc().timestamp_millis())
        .ok_or_else(|| format!("invalid date/time '{} {}'", date, time))
}

/// Renders decimal degrees with micro-degree precision, trimming trailing
/// zeros (`48.117300` → `48.1173`).
fn format_degrees(value: f64) -> String {
    let text = format!("{:.6}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
