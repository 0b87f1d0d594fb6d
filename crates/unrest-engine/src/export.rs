//! Output sinks: JSON Lines tick summaries and a final agent dump.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::warn;

use unrest_core::{Model, TickCallback};
use unrest_types::{AgentRecord, TickSummary};

use crate::error::EngineError;

/// Writes one JSON object per tick summary.
///
/// The run loop cannot fail, so write errors are held until
/// [`finish`](Self::finish); after the first one, later ticks are skipped.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    lines: u64,
    error: Option<EngineError>,
}

impl JsonLinesSink<BufWriter<File>> {
    /// Create (or truncate) `path` and write to it.
    pub fn create(path: &Path) -> Result<Self, EngineError> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesSink<W> {
    /// Wrap an arbitrary writer.
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            lines: 0,
            error: None,
        }
    }

    /// Append one summary, unless an earlier write failed.
    pub fn write_summary(&mut self, summary: &TickSummary) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.try_write(summary) {
            warn!(tick = summary.tick, error = %e, "tick export failed, later ticks skipped");
            self.error = Some(e);
        }
    }

    fn try_write(&mut self, summary: &TickSummary) -> Result<(), EngineError> {
        serde_json::to_writer(&mut self.writer, summary)?;
        self.writer.write_all(b"\n")?;
        self.lines = self.lines.saturating_add(1);
        Ok(())
    }

    /// Lines written so far.
    pub const fn lines(&self) -> u64 {
        self.lines
    }

    /// Flush and report the first error, if any. Returns the writer.
    pub fn finish(mut self) -> Result<W, EngineError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> TickCallback for JsonLinesSink<W> {
    fn on_tick(&mut self, summary: &TickSummary, _model: &Model) {
        self.write_summary(summary);
    }
}

/// Write agent records to `path` as a pretty-printed JSON array.
pub fn write_agents(path: &Path, records: &[AgentRecord]) -> Result<(), EngineError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
