/// Format parsers: raw source text → `CanonicalPoint`s.
///
/// Each source format has its own "unit of record" (one JSON measure entry,
/// one NMEA sentence, one rain-log line). A unit that cannot produce a
/// complete point is skipped and reported in the `ParseReport`; it never
/// aborts the rest of the file. Only a file whose top-level structure is
/// unreadable fails with `IngestError::MalformedInput`.

pub mod datetime;
pub mod json_measurements;
pub mod nmea;
pub mod rain_log;

#[cfg(test)]
pub(crate) mod fixtures;

use std::fmt;

use crate::model::CanonicalPoint;

pub use json_measurements::parse_json_measurements;
pub use nmea::parse_nmea;
pub use rain_log::{parse_rain_log, RainGauge};

/// A record within an otherwise valid source that was excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedUnit {
    /// 1-based record number: non-blank line (line formats) or measure entry (JSON).
    pub unit: usize,
    pub reason: String,
}

impl fmt::Display for SkippedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit {}: {}", self.unit, self.reason)
    }
}

/// Output of one parser invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    pub points: Vec<CanonicalPoint>,
    pub skipped: Vec<SkippedUnit>,
}

impl ParseReport {
    pub(crate) fn skip(&mut self, unit: usize, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(unit, %reason, "skipping unparseable unit");
        self.skipped.push(SkippedUnit { unit, reason });
    }
}

/// Iterates non-blank, trimmed lines numbered from 1 in order of appearance.
///
/// Handles `\n`, `\r\n` and bare `\r` terminators.
pub(crate) fn numbered_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split(['\n', '\r'])
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_lines_skips_blank_and_handles_crlf() {
        let lines: Vec<_> = numbered_lines("a\r\n\r\nb\n  \nc\r").collect();
        assert_eq!(lines, vec![(1, "a"), (2, "b"), (3, "c")]);
    }

    #[test]
    fn test_numbered_lines_empty_input() {
        assert_eq!(numbered_lines("").count(), 0);
    }
}
