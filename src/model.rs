/// Shared data types for the ingestion pipeline.
///
/// Every parser converges on `CanonicalPoint`, which keeps the store
/// writer format-agnostic. A point can only be built through
/// `CanonicalPoint::new`, so a half-populated point never leaves a parser.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::PointError;

// ---------------------------------------------------------------------------
// Field values
// ---------------------------------------------------------------------------

/// A measured value carried in a point's field set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Boolean(bool),
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

// ---------------------------------------------------------------------------
// Canonical point
// ---------------------------------------------------------------------------

/// One time-series sample: measurement, tags, fields and an epoch-millisecond
/// timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalPoint {
    measurement: String,
    tags: BTreeMap<String, String>,
    fields: BTreeMap<String, FieldValue>,
    timestamp: i64,
}

impl CanonicalPoint {
    /// Builds a point, rejecting anything that is not fully formed.
    ///
    /// # Errors
    /// - `PointError::EmptyMeasurement` - measurement is empty or blank.
    /// - `PointError::NoFields` - the field set is empty.
    /// - `PointError::NonFiniteField` - a float field is NaN or infinite.
    /// - `PointError::NegativeTimestamp` - timestamp precedes the epoch.
    pub fn new(
        measurement: impl Into<String>,
        tags: BTreeMap<String, String>,
        fields: BTreeMap<String, FieldValue>,
        timestamp: i64,
    ) -> Result<Self, PointError> {
        let measurement = measurement.into();
        if measurement.trim().is_empty() {
            return Err(PointError::EmptyMeasurement);
        }
        if fields.is_empty() {
            return Err(PointError::NoFields);
        }
        if let Some((key, _)) = fields
            .iter()
            .find(|(_, v)| matches!(v, FieldValue::Float(f) if !f.is_finite()))
        {
            return Err(PointError::NonFiniteField(key.clone()));
        }
        if timestamp < 0 {
            return Err(PointError::NegativeTimestamp(timestamp));
        }

        Ok(Self {
            measurement,
            tags,
            fields,
            timestamp,
        })
    }

    /// Convenience constructor for the common single-`value` field shape.
    pub fn with_value(
        measurement: impl Into<String>,
        tags: BTreeMap<String, String>,
        value: FieldValue,
        timestamp: i64,
    ) -> Result<Self, PointError> {
        let mut fields = BTreeMap::new();
        fields.insert("value".to_string(), value);
        Self::new(measurement, tags, fields, timestamp)
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    /// Milliseconds since the Unix epoch.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// On-disk format of a sensor source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceFormat {
    JsonMeasurements,
    NmeaGps,
    RainLog,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::JsonMeasurements => "json-measurements",
            SourceFormat::NmeaGps => "nmea-gps",
            SourceFormat::RainLog => "rain-log",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json-measurements" => Ok(SourceFormat::JsonMeasurements),
            "nmea-gps" => Ok(SourceFormat::NmeaGps),
            "rain-log" => Ok(SourceFormat::RainLog),
            other => Err(format!(
                "unknown source format '{}' (expected json-measurements, nmea-gps or rain-log)",
                other
            )),
        }
    }
}

/// A file to ingest and the format it is written in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    pub path: PathBuf,
    pub format: SourceFormat,
}

impl SourceDescriptor {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, format: SourceFormat) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            format,
        }
    }
}
