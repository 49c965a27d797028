/// One ingestion run: read a source file, parse it, write its points.
///
/// A run moves through `Idle → Reading → Parsing → Writing → Done`, or ends
/// in `Failed` when the file cannot be read. A file whose top-level structure
/// is unparseable aborts the run in `Parsing` with nothing written.
/// Per-unit and per-point problems never fail the run; they are counted in
/// the returned `RunOutcome`.

use std::fmt;
use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::IngestError;
use crate::ingest::{parse_json_measurements, parse_nmea, parse_rain_log, ParseReport, RainGauge};
use crate::model::{SourceDescriptor, SourceFormat};
use crate::store::{PointFailure, StoreWriter};

// ---------------------------------------------------------------------------
// Run state and results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Reading,
    Parsing,
    Writing,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Reading => "reading",
            RunState::Parsing => "parsing",
            RunState::Writing => "writing",
            RunState::Done => "done",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOutcome {
    /// Name of the source this run ingested.
    pub source: String,
    pub points_parsed: usize,
    pub points_written: usize,
    pub points_failed: usize,
    pub units_skipped: usize,
    pub errors: Vec<PointFailure>,
    /// The source had content but not a single point could be parsed from it.
    pub data_quality_warning: bool,
}

impl RunOutcome {
    fn empty(source: &str) -> Self {
        Self {
            source: source.to_string(),
            ..Self::default()
        }
    }
}

/// Per-run settings that are not part of the source itself.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub rain: RainGauge,
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

struct Run<'a> {
    source: &'a SourceDescriptor,
    state: RunState,
}

impl<'a> Run<'a> {
    fn new(source: &'a SourceDescriptor) -> Self {
        Self {
            source,
            state: RunState::Idle,
        }
    }

    fn transition(&mut self, next: RunState) {
        debug!(source = %self.source.name, from = %self.state, to = %next, "run state");
        self.state = next;
    }

    /// Ends the run with `err`. Only a read failure moves it to `Failed`;
    /// any other error leaves the run in the state it was aborted from.
    fn abort(&mut self, err: IngestError) -> IngestError {
        match err {
            IngestError::SourceUnavailable { .. } => self.transition(RunState::Failed),
            IngestError::MalformedInput(_) => {
                warn!(source = %self.source.name, state = %self.state, error = %err, "run aborted");
            }
        }
        err
    }
}

/// Ingests one source end to end.
///
/// # Errors
/// - `IngestError::SourceUnavailable` if the file cannot be read.
/// - `IngestError::MalformedInput` if the file's overall structure is
///   invalid; nothing is written in that case.
pub fn ingest(
    source: &SourceDescriptor,
    writer: &StoreWriter,
    options: &RunOptions,
) -> Result<RunOutcome, IngestError> {
    let mut run = Run::new(source);

    run.transition(RunState::Reading);
    let bytes = match fs::read(&source.path) {
        Ok(bytes) => bytes,
        Err(e) => {
            return Err(run.abort(IngestError::SourceUnavailable {
                path: source.path.clone(),
                source: e,
            }));
        }
    };
    let text = String::from_utf8_lossy(&bytes);

    run.transition(RunState::Parsing);
    if text.trim().is_empty() {
        info!(source = %source.name, "source is empty, nothing to ingest");
        run.transition(RunState::Done);
        return Ok(RunOutcome::empty(&source.name));
    }

    let report = match parse(source.format, &text, options) {
        Ok(report) => report,
        Err(e) => return Err(run.abort(e)),
    };

    let mut outcome = RunOutcome::empty(&source.name);
    outcome.points_parsed = report.points.len();
    outcome.units_skipped = report.skipped.len();

    if report.points.is_empty() {
        outcome.data_quality_warning = true;
        warn!(
            source = %source.name,
            skipped = outcome.units_skipped,
            "source has content but yielded no points"
        );
    }

    run.transition(RunState::Writing);
    let written = writer.write_points(report.points);
    outcome.points_written = written.succeeded;
    outcome.points_failed = written.failed;
    outcome.errors = written.failures;

    run.transition(RunState::Done);
    info!(
        source = %source.name,
        parsed = outcome.points_parsed,
        written = outcome.points_written,
        failed = outcome.points_failed,
        skipped = outcome.units_skipped,
        "run complete"
    );

    Ok(outcome)
}

fn parse(format: SourceFormat, text: &str, options: &RunOptions) -> Result<ParseReport, IngestError> {
    match format {
        SourceFormat::JsonMeasurements => parse_json_measurements(text),
        SourceFormat::NmeaGps => Ok(parse_nmea(text)),
        SourceFormat::RainLog => Ok(parse_rain_log(text, &options.rain)),
    }
}

fn adhoc_source(path: &Path, format: SourceFormat) -> SourceDescriptor {
    SourceDescriptor::new(path.display().to_string(), path, format)
}

/// Ingests a JSON measurements document.
pub fn ingest_json_measurements(
    path: impl AsRef<Path>,
    writer: &StoreWriter,
) -> Result<RunOutcome, IngestError> {
    let source = adhoc_source(path.as_ref(), SourceFormat::JsonMeasurements);
    ingest(&source, writer, &RunOptions::default())
}

/// Ingests an NMEA-0183 GPS dump.
pub fn ingest_nmea_gps(
    path: impl AsRef<Path>,
    writer: &StoreWriter,
) -> Result<RunOutcome, IngestError> {
    let source = adhoc_source(path.as_ref(), SourceFormat::NmeaGps);
    ingest(&source, writer, &RunOptions::default())
}

/// Ingests a rain gauge tip log using the given calibration.
pub fn ingest_rain_log(
    path: impl AsRef<Path>,
    writer: &StoreWriter,
    gauge: &RainGauge,
) -> Result<RunOutcome, IngestError> {
    let source = adhoc_source(path.as_ref(), SourceFormat::RainLog);
    let options = RunOptions { rain: gauge.clone() };
    ingest(&source, writer, &options)
}
