//! JSON line-delimited event logging.
//!
//! Training and inference drivers append one JSON object per line to an
//! [`EventLog`]. The core model never logs on its own; callers opt in, and a
//! failed append is reported to the caller rather than aborting a run.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

/// Append-only JSON-lines sink.
pub struct EventLog {
    out: BufWriter<File>,
}

impl EventLog {
    /// Creates (or truncates) the log file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            out: BufWriter::new(file),
        })
    }

    /// Opens the log file at `path` for appending.
    pub fn append_to<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            out: BufWriter::new(file),
        })
    }

    /// Appends one event as a single JSON line.
    pub fn append<T: Serialize>(&mut self, event: &T) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, event)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

/// One training call.
#[derive(Debug, Serialize)]
pub struct TrainEvent {
    pub sample: usize,
    pub target: usize,
}

/// One inference call and its cached outcome.
#[derive(Debug, Serialize)]
pub struct ReadEvent {
    pub sample: usize,
    pub method: &'static str,
    pub predicted: usize,
    pub confidence: f32,
}
