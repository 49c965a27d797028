/// Time-series store delivery.
///
/// `PointSink` is the seam to the actual store (InfluxDB over HTTP,
/// PostgreSQL, or stdout for dry runs). `StoreWriter` sits on top of a sink
/// and delivers a run's points one request per point, isolating failures:
/// a rejected or unreachable write is recorded in the `WriteOutcome` and the
/// remaining points are still attempted. Failed writes are not retried; the
/// next scheduled cycle re-reads the source.

pub mod influx;
pub mod line_protocol;
pub mod pg;
pub mod stdout;

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::{StoreBackend, StoreSettings};
use crate::error::StoreError;
use crate::model::CanonicalPoint;

pub use influx::InfluxClient;
pub use pg::PostgresSink;
pub use stdout::StdoutSink;

// ---------------------------------------------------------------------------
// Sink trait
// ---------------------------------------------------------------------------

/// A store client able to persist single points.
///
/// Implementations are shared between concurrently running sources, so they
/// must be safe for concurrent use.
pub trait PointSink: Send + Sync {
    /// Writes one point into `database` with millisecond precision.
    fn write_point(&self, point: &CanonicalPoint, database: &str) -> Result<(), StoreError>;

    /// Creates the target database if the store needs it. Idempotent.
    fn ensure_database(&self, _database: &str) -> Result<(), StoreError> {
        Ok(())
    }

    /// Short human-readable description for startup logs.
    fn describe(&self) -> String;
}

/// Builds the sink selected by `settings.backend`.
pub fn open_sink(settings: &StoreSettings) -> Result<Arc<dyn PointSink>, Box<dyn Error>> {
    let sink: Arc<dyn PointSink> = match settings.backend {
        StoreBackend::Influx => Arc::new(InfluxClient::new(
            &settings.url,
            settings.username.as_deref().zip(settings.password.as_deref()),
            Duration::from_secs(settings.timeout_secs),
        )?),
        StoreBackend::Postgres => Arc::new(PostgresSink::connect()?),
        StoreBackend::Stdout => Arc::new(StdoutSink),
    };
    Ok(sink)
}

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// A point that could not be delivered, with enough context to find it.
#[derive(Debug, Clone, PartialEq)]
pub struct PointFailure {
    pub measurement: String,
    pub timestamp: i64,
    pub reason: String,
}

impl fmt::Display for PointFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}: {}", self.measurement, self.timestamp, self.reason)
    }
}

/// Aggregate result of delivering a sequence of points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteOutcome {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<PointFailure>,
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Delivers points to one database through a shared sink.
#[derive(Clone)]
pub struct StoreWriter {
    sink: Arc<dyn PointSink>,
    database: String,
}

impl StoreWriter {
    pub fn new(sink: Arc<dyn PointSink>, database: impl Into<String>) -> Self {
        Self {
            sink,
            database: database.into(),
        }
    }

    pub fn describe(&self) -> String {
        format!("{} (database '{}')", self.sink.describe(), self.database)
    }

    /// Ensures the target database exists.
    pub fn bootstrap(&self) -> Result<(), StoreError> {
        self.sink.ensure_database(&self.database)
    }

    /// Writes every point with an independent request.
    ///
    /// Never fails as a whole: each failed point is logged and listed in the
    /// returned outcome while the rest of the sequence is still written.
    pub fn write_points<I>(&self, points: I) -> WriteOutcome
    where
        I: IntoIterator<Item = CanonicalPoint>,
    {
        let mut outcome = WriteOutcome::default();

        for point in points {
            outcome.attempted += 1;
            match self.sink.write_point(&point, &self.database) {
                Ok(()) => {
                    outcome.succeeded += 1;
                    debug!(
                        measurement = point.measurement(),
                        timestamp = point.timestamp(),
                        "point written"
                    );
                }
                Err(e) => {
                    warn!(
                        measurement = point.measurement(),
                        timestamp = point.timestamp(),
                        error = %e,
                        "failed to write point"
                    );
                    outcome.failed += 1;
                    outcome.failures.push(PointFailure {
                        measurement: point.measurement().to_string(),
                        timestamp: point.timestamp(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// In-memory sink that records every write and fails the requested
    /// (0-based) write attempts.
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub written: Mutex<Vec<(CanonicalPoint, String)>>,
        pub fail_attempts: HashSet<usize>,
        attempts: Mutex<usize>,
    }

    impl RecordingSink {
        pub fn failing_on(attempts: &[usize]) -> Self {
            Self {
                fail_attempts: attempts.iter().copied().collect(),
                ..Self::default()
            }
        }

        pub fn written(&self) -> Vec<(CanonicalPoint, String)> {
            self.written.lock().unwrap().clone()
        }
    }

    impl PointSink for RecordingSink {
        fn write_point(&self, point: &CanonicalPoint, database: &str) -> Result<(), StoreError> {
            let mut attempts = self.attempts.lock().unwrap();
            let attempt = *attempts;
            *attempts += 1;

            if self.fail_attempts.contains(&attempt) {
                return Err(StoreError::Rejected {
                    status: 500,
                    message: "simulated store error".to_string(),
                });
            }
            self.written
                .lock()
                .unwrap()
                .push((point.clone(), database.to_string()));
            Ok(())
        }

        fn describe(&self) -> String {
            "recording sink".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingSink;
    use super::*;
    use crate::ingest::fixtures::fixture_single_measure_json;
    use crate::ingest::parse_json_measurements;
    use crate::model::FieldValue;
    use std::collections::BTreeMap;

    fn point(ts: i64) -> CanonicalPoint {
        CanonicalPoint::with_value("temp", BTreeMap::new(), FieldValue::Float(1.0), ts).unwrap()
    }

    #[test]
    fn test_fixture_point_reaches_sink_unchanged() {
        let report = parse_json_measurements(fixture_single_measure_json()).unwrap();
        let expected = report.points[0].clone();

        let sink = Arc::new(RecordingSink::default());
        let writer = StoreWriter::new(sink.clone(), "weatherStationDB");
        let outcome = writer.write_points(report.points);

        assert_eq!(outcome.attempted, 1);
        assert_eq!(outcome.succeeded, 1);

        let written = sink.written();
        assert_eq!(written.len(), 1, "exactly one write request");
        assert_eq!(written[0].0, expected);
        assert_eq!(written[0].0.timestamp(), 1_704_067_200_000);
        assert_eq!(written[0].1, "weatherStationDB");
    }

    #[test]
    fn test_single_failure_does_not_abort_siblings() {
        let sink = Arc::new(RecordingSink::failing_on(&[2]));
        let writer = StoreWriter::new(sink.clone(), "db");

        let outcome = writer.write_points((1..=5).map(point));

        assert_eq!(outcome.attempted, 5);
        assert_eq!(outcome.succeeded, 4);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].measurement, "temp");
        assert_eq!(outcome.failures[0].timestamp, 3);
        assert!(outcome.failures[0].reason.contains("simulated store error"));

        let written: Vec<_> = sink.written().iter().map(|(p, _)| p.timestamp()).collect();
        assert_eq!(written, vec![1, 2, 4, 5], "neighbours of the failed write succeed");
    }

    #[test]
    fn test_all_failures_reported() {
        let sink = Arc::new(RecordingSink::failing_on(&[0, 1, 2]));
        let writer = StoreWriter::new(sink, "db");

        let outcome = writer.write_points((0..3).map(point));

        assert_eq!(outcome.succeeded, 0);
        assert_eq!(outcome.failed, 3);
    }

    #[test]
    fn test_empty_sequence_writes_nothing() {
        let sink = Arc::new(RecordingSink::default());
        let writer = StoreWriter::new(sink.clone(), "db");

        let outcome = writer.write_points(Vec::new());

        assert_eq!(outcome, WriteOutcome::default());
        assert!(sink.written().is_empty());
    }

    #[test]
    fn test_failure_display_has_context() {
        let failure = PointFailure {
            measurement: "rain".to_string(),
            timestamp: 42,
            reason: "timeout".to_string(),
        };
        assert_eq!(failure.to_string(), "rain @ 42: timeout");
    }
}
