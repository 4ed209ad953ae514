//! Step log sinks. The trainer hands every finished episode's logs to a
//! sink once the whole batch has completed.
//! - StepLogSink: trait used by the trainer
//! - NoopSink:    discards everything
//! - JsonlSink:   one JSON object per step

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::game::StepLog;

pub trait StepLogSink {
    fn record_episode(&mut self, episode_id: usize, logs: &[StepLog]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Whether the trainer should bother recording step logs at all.
    fn wants_logs(&self) -> bool {
        true
    }
}

/// Sink that discards all logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl StepLogSink for NoopSink {
    fn record_episode(&mut self, _episode_id: usize, _logs: &[StepLog]) -> io::Result<()> {
        Ok(())
    }

    fn wants_logs(&self) -> bool {
        false
    }
}

#[derive(serde::Serialize)]
struct JsonlRecord<'a> {
    episode: usize,
    #[serde(flatten)]
    log: &'a StepLog,
}

/// JSONL sink: each step is written as a single JSON object on its own line,
/// tagged with its episode id.
pub struct JsonlSink<W: Write> {
    writer: W,
    lines: usize,
}

impl JsonlSink<BufWriter<File>> {
    /// Create a new sink writing to `path`, truncating any existing file.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        JsonlSink { writer, lines: 0 }
    }

    /// Lines written so far.
    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> StepLogSink for JsonlSink<W> {
    fn record_episode(&mut self, episode_id: usize, logs: &[StepLog]) -> io::Result<()> {
        for log in logs {
            let record = JsonlRecord {
                episode: episode_id,
                log,
            };
            serde_json::to_writer(&mut self.writer, &record)?;
            self.writer.write_all(b"\n")?;
            self.lines += 1;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
