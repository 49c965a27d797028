/// Periodic ingestion daemon for the weather station
///
/// This module implements the main daemon loop that:
/// 1. Bootstraps the target database on startup
/// 2. Every poll interval, ingests each configured source once
/// 3. Runs the sources of a cycle concurrently on a worker pool
/// 4. Logs a per-source summary and sleeps until the next cycle
///
/// Sources are independent: a missing or malformed file fails its own run
/// and nothing else. Cycles never overlap within one process because the
/// loop joins every run before sleeping.

use std::error::Error;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use threadpool::ThreadPool;
use tracing::{error, info, warn};

use crate::config::IngestConfig;
use crate::error::{IngestError, StoreError};
use crate::model::SourceDescriptor;
use crate::run::{ingest, RunOptions, RunOutcome};
use crate::store::StoreWriter;

/// Result of one source's run within a cycle.
pub type CycleResult = (String, Result<RunOutcome, IngestError>);

// ---------------------------------------------------------------------------
// Daemon State
// ---------------------------------------------------------------------------

pub struct Daemon {
    config: IngestConfig,
    writer: StoreWriter,
    pool: ThreadPool,
}

impl Daemon {
    pub fn new(config: IngestConfig, writer: StoreWriter) -> Self {
        let workers = config.worker_threads.min(config.sources.len()).max(1);
        Self {
            pool: ThreadPool::with_name("ingest-worker".to_string(), workers),
            config,
            writer,
        }
    }

    pub fn sources(&self) -> &[SourceDescriptor] {
        &self.config.sources
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.config.poll_interval_minutes * 60)
    }

    /// Initialize daemon: make sure the target database exists
    pub fn initialize(&self) -> Result<(), StoreError> {
        info!(store = %self.writer.describe(), "bootstrapping store");
        self.writer.bootstrap()
    }

    /// Run every configured source once, concurrently.
    ///
    /// Results are returned in configuration order.
    pub fn run_cycle(&self) -> Vec<CycleResult> {
        let (tx, rx) = mpsc::channel();
        let options = RunOptions {
            rain: self.config.rain.clone(),
        };

        for (index, source) in self.config.sources.iter().cloned().enumerate() {
            let tx = tx.clone();
            let writer = self.writer.clone();
            let options = options.clone();

            self.pool.execute(move || {
                let result = ingest(&source, &writer, &options);
                // The receiver outlives every job of the cycle.
                let _ = tx.send((index, source.name, result));
            });
        }
        drop(tx);

        let mut results: Vec<_> = rx.iter().collect();
        if results.len() != self.config.sources.len() {
            error!(
                expected = self.config.sources.len(),
                received = results.len(),
                "ingest worker panicked; some sources have no result this cycle"
            );
        }
        results.sort_by_key(|(index, _, _)| *index);
        results
            .into_iter()
            .map(|(_, name, result)| (name, result))
            .collect()
    }

    /// Main daemon loop (runs indefinitely)
    pub fn run(&self) -> Result<(), Box<dyn Error>> {
        info!(
            interval_minutes = self.config.poll_interval_minutes,
            sources = self.config.sources.len(),
            "starting daemon loop"
        );

        loop {
            let start = Instant::now();

            let results = self.run_cycle();
            log_cycle_summary(&results);

            // Sleep until next poll interval
            if let Some(remaining) = self.poll_interval().checked_sub(start.elapsed()) {
                thread::sleep(remaining);
            }
        }
    }
}

/// Logs one line per source plus a cycle total.
pub fn log_cycle_summary(results: &[CycleResult]) {
    let mut written = 0;
    let mut failed_sources = 0;

    for (name, result) in results {
        match result {
            Ok(outcome) => {
                written += outcome.points_written;
                if outcome.points_failed > 0 {
                    warn!(
                        source = %name,
                        failed = outcome.points_failed,
                        "some points were not stored"
                    );
                }
            }
            Err(e) => {
                failed_sources += 1;
                error!(source = %name, error = %e, "source run failed");
            }
        }
    }

    info!(
        sources = results.len(),
        failed_sources,
        points_written = written,
        "cycle complete"
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
