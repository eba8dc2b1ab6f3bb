use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

use super::ProbeSink;
use crate::error::SinkError;
use crate::probe::record::{ProbeRecord, TIMESTAMP_FORMAT};

/// Appends one line per record to a text file.
#[derive(Debug, Clone)]
pub struct LogFileSink {
    path: PathBuf,
}

impl LogFileSink {
    /// Create the parent directory and the file if needed, so an unusable
    /// path is reported before the first probe runs.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let sink = Self { path: path.into() };
        if let Some(parent) = sink.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| sink.io_error(source))?;
        }
        sink.append_file()?;
        Ok(sink)
    }

    /// Write a `CRITICAL ERROR` diagnostic line.
    pub fn append_critical(&self, message: &str) -> Result<(), SinkError> {
        let line = format!(
            "{} | CRITICAL ERROR: {}",
            Local::now().format(TIMESTAMP_FORMAT),
            message.replace('\n', " ")
        );
        self.append_line(&line)
    }

    fn append_line(&self, line: &str) -> Result<(), SinkError> {
        let mut file = self.append_file()?;
        writeln!(file, "{line}")
            .and_then(|_| file.flush())
            .map_err(|source| self.io_error(source))
    }

    fn append_file(&self) -> Result<File, SinkError> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: std::io::Error) -> SinkError {
        SinkError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ProbeSink for LogFileSink {
    fn emit(&mut self, record: &ProbeRecord) -> Result<(), SinkError> {
        self.append_line(&record.log_line())
    }
}
