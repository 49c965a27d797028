/// JSON measurement document parser.
///
/// The sensor logger writes one document per sampling interval:
///
/// ```json
/// {
///   "date": "2024-01-01T00:00:00Z",
///   "measure": [
///     { "name": "temperature", "unit": "C", "desc": "air temp", "value": 21 }
///   ]
/// }
/// ```
///
/// Every entry in `measure` becomes one point stamped with the document's
/// `date`. Entries missing any of `name`, `unit`, `desc` or `value` are
/// skipped; a document missing `date` or `measure` is malformed.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::datetime::parse_epoch_millis;
use super::ParseReport;
use crate::error::IngestError;
use crate::model::{CanonicalPoint, FieldValue};

// ---------------------------------------------------------------------------
// Serde structures
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct MeasurementDocument {
    date: String,
    measure: Vec<Value>,
}

/// Entry shape with every key optional so a missing key is reported per
/// entry instead of failing the whole document.
#[derive(Deserialize)]
struct MeasureEntry {
    name: Option<String>,
    unit: Option<String>,
    desc: Option<String>,
    value: Option<Value>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parses a JSON measurement document into one point per measure entry.
///
/// # Errors
/// `IngestError::MalformedInput` when the text is not JSON, the document
/// lacks `date` or `measure`, or `date` is not a recognisable date/time.
pub fn parse_json_measurements(text: &str) -> Result<ParseReport, IngestError> {
    let doc: MeasurementDocument = serde_json::from_str(text)
        .map_err(|e| IngestError::MalformedInput(format!("JSON deserialization failed: {}", e)))?;

    let timestamp = parse_epoch_millis(&doc.date).ok_or_else(|| {
        IngestError::MalformedInput(format!("unparseable document date '{}'", doc.date))
    })?;

    let mut report = ParseReport::default();

    for (idx, raw) in doc.measure.into_iter().enumerate() {
        let unit_no = idx + 1;
        match entry_to_point(raw, timestamp) {
            Ok(point) => report.points.push(point),
            Err(reason) => report.skip(unit_no, reason),
        }
    }

    Ok(report)
}

fn entry_to_point(raw: Value, timestamp: i64) -> Result<CanonicalPoint, String> {
    let entry: MeasureEntry =
        serde_json::from_value(raw).map_err(|e| format!("invalid measure entry: {}", e))?;

    let name = entry.name.ok_or("missing 'name'")?;
    let unit = entry.unit.ok_or("missing 'unit'")?;
    let desc = entry.desc.ok_or("missing 'desc'")?;
    let value = entry.value.ok_or("missing 'value'")?;

    let value = json_to_field(&value)
        .ok_or_else(|| format!("'value' of '{}' is not numeric or boolean: {}", name, value))?;

    let mut tags = BTreeMap::new();
    tags.insert("unit".to_string(), unit);
    tags.insert("desc".to_string(), desc);

    CanonicalPoint::with_value(name, tags, value, timestamp).map_err(|e| e.to_string())
}

/// Maps a JSON scalar to a field value.
///
/// All numbers become floats: a sensor that reports `21` one interval and
/// `21.5` the next must not flip the stored field type. Quoted numbers are
/// accepted since some sensor firmware serialises readings as strings.
fn json_to_field(value: &Value) -> Option<FieldValue> {
    match value {
        Value::Bool(b) => Some(FieldValue::Boolean(*b)),
        Value::Number(n) => n.as_f64().map(FieldValue::Float),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(FieldValue::Float),
        _ => None,
    }
}
