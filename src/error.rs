use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating the static configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid DNS server address: {0}")]
    InvalidDnsServer(String),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("invalid domain: {0}")]
    InvalidDomain(String),
}

/// Errors raised by a probe sink. These are never swallowed.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to append to log file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write to the console: {0}")]
    Console(#[source] std::io::Error),
}

/// Faults that terminate the scheduling loop.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("probe sink failed: {0}")]
    Sink(#[from] SinkError),

    #[error("monitor task aborted: {0}")]
    Task(#[from] tokio::task::JoinError),
}
