//! Diagnostic sinks for the fuzzer's step-by-step narration.
//!
//! The narration is independent of the `log` output: it is the verbatim trace
//! of what the fuzzer does, and it goes wherever the selected [`Sink`] puts it.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::warn;

/// Name of the file written by [`FileSink`].
pub const LOG_FILE_NAME: &str = "logic_log.txt";

pub trait Sink {
    /// Record one line of text.
    fn record(&mut self, line: &str);
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct SilentSink;

impl Sink for SilentSink {
    fn record(&mut self, _line: &str) {}
}

/// Prints each line to standard output.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn record(&mut self, line: &str) {
        println!("{}", line);
    }
}

/// Writes each line to a file, truncated when the sink is created.
///
/// If the file cannot be created the sink degrades to discarding lines.
#[derive(Debug)]
pub struct FileSink {
    file: Option<BufWriter<File>>,
}

impl FileSink {
    pub fn new() -> Self {
        Self::create(LOG_FILE_NAME)
    }

    pub fn create(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let file = match File::create(path) {
            Ok(file) => Some(BufWriter::new(file)),
            Err(e) => {
                warn!("Could not open log file {}: {}", path.display(), e);
                None
            }
        };
        Self { file }
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }
}

impl Default for FileSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for FileSink {
    fn record(&mut self, line: &str) {
        if let Some(file) = &mut self.file {
            if let Err(e) = writeln!(file, "{}", line).and_then(|_| file.flush()) {
                warn!("Could not write to log file: {}", e);
                self.file = None;
            }
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SinkKind {
    Silent,
    Stdout,
    File,
}

impl SinkKind {
    pub fn create(self) -> Box<dyn Sink> {
        match self {
            SinkKind::Silent => Box::new(SilentSink),
            SinkKind::Stdout => Box::new(StdoutSink),
            SinkKind::File => Box::new(FileSink::new()),
        }
    }
}

/// Collects lines in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub lines: Vec<String>,
}

impl Sink for MemorySink {
    fn record(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn record(&mut self, line: &str) {
        (**self).record(line);
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn record(&mut self, line: &str) {
        (**self).record(line);
    }
}
