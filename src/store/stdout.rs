/// Dry-run sink: prints each point as line protocol instead of storing it.

use std::io::Write;

use super::{line_protocol, PointSink};
use crate::error::StoreError;
use crate::model::CanonicalPoint;

pub struct StdoutSink;

impl PointSink for StdoutSink {
    fn write_point(&self, point: &CanonicalPoint, _database: &str) -> Result<(), StoreError> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        writeln!(out, "{}", line_protocol::render(point))?;
        Ok(())
    }

    fn describe(&self) -> String {
        "stdout (dry run)".to_string()
    }
}
