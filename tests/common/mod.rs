//! Shared helpers for integration tests: an in-memory sink and source files
//! written to a temporary directory.

#![allow(dead_code)]

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use station_ingest::error::StoreError;
use station_ingest::model::CanonicalPoint;
use station_ingest::store::PointSink;
use tempfile::TempDir;

/// Records every write; fails the listed (0-based) write attempts.
#[derive(Default)]
pub struct MemorySink {
    points: Mutex<Vec<CanonicalPoint>>,
    attempts: Mutex<usize>,
    fail_attempts: HashSet<usize>,
    bootstrapped: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn failing_on(attempts: &[usize]) -> Self {
        Self {
            fail_attempts: attempts.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn points(&self) -> Vec<CanonicalPoint> {
        self.points.lock().unwrap().clone()
    }

    pub fn bootstrapped(&self) -> Vec<String> {
        self.bootstrapped.lock().unwrap().clone()
    }
}

impl PointSink for MemorySink {
    fn write_point(&self, point: &CanonicalPoint, _database: &str) -> Result<(), StoreError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            *attempts += 1;
            *attempts - 1
        };
        if self.fail_attempts.contains(&attempt) {
            return Err(StoreError::Rejected {
                status: 400,
                message: "partial write: field type conflict".to_string(),
            });
        }
        self.points.lock().unwrap().push(point.clone());
        Ok(())
    }

    fn ensure_database(&self, database: &str) -> Result<(), StoreError> {
        self.bootstrapped.lock().unwrap().push(database.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Writes `contents` to `name` inside `dir`.
pub fn write_source(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

pub const SENSORS_JSON: &str = r#"{
  "date": "2024-01-01T00:00:00Z",
  "measure": [
    { "name": "temperature", "unit": "C", "desc": "Air temperature", "value": 4.5 },
    { "name": "humidity", "unit": "%", "desc": "Relative humidity", "value": 81 },
    { "name": "rain_sensor", "unit": "", "desc": "Rain detected", "value": true }
  ]
}"#;

pub const GPS_NMEA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\n\
$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A\n\
$GPRMC,225446.50,V,,,,,,,191194,,*1C\n";

pub const RAIN_LOG: &str = "2024-01-01T00:00:00Z\n2024-01-01 00:00:15\n";
