/// Rain gauge tip-counter log parser.
///
/// The tipping-bucket gauge appends the date/time of every bucket tip as a
/// line of text. Each tip is one discrete rain event whose volume is the
/// gauge's calibration constant, so every parseable line becomes one
/// `rain` point.

use serde::Deserialize;
use std::collections::BTreeMap;

use super::datetime::parse_epoch_millis;
use super::{numbered_lines, ParseReport};
use crate::model::{CanonicalPoint, FieldValue};

pub const RAIN_MEASUREMENT: &str = "rain";

/// Calibration and descriptive metadata of the physical rain gauge.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RainGauge {
    /// Rain volume represented by one bucket tip (mm/m²).
    pub volume_per_tip: f64,
    pub description: String,
    pub units: String,
}

impl Default for RainGauge {
    fn default() -> Self {
        Self {
            volume_per_tip: 0.32,
            description: "Dates des basculements".to_string(),
            units: "mm/m²".to_string(),
        }
    }
}

/// Parses a tip log into one point per tip line.
///
/// Lines that do not parse as a date/time are skipped. Never fails.
pub fn parse_rain_log(text: &str, gauge: &RainGauge) -> ParseReport {
    let mut report = ParseReport::default();

    let mut tags = BTreeMap::new();
    tags.insert("description".to_string(), gauge.description.clone());
    tags.insert("units".to_string(), gauge.units.clone());

    for (line_no, line) in numbered_lines(text) {
        let Some(timestamp) = parse_epoch_millis(line) else {
            report.skip(line_no, format!("unparseable tip time '{}'", line));
            continue;
        };

        match CanonicalPoint::with_value(
            RAIN_MEASUREMENT,
            tags.clone(),
            FieldValue::Float(gauge.volume_per_tip),
            timestamp,
        ) {
            Ok(point) => report.points.push(point),
            Err(e) => report.skip(line_no, e.to_string()),
        }
    }

    report
}
