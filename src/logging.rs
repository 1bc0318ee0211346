//! Tracing setup
//!
//! The terminal belongs to the editor, so logs only ever go to a file.
//! Without `--log-file` every event is dropped.

use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber
///
/// `level` overrides `RUST_LOG`, which in turn defaults to `info`. The returned
/// guard flushes the writer on drop and must outlive the editor.
pub fn init(log_file: Option<&Path>, level: Option<&str>) -> io::Result<WorkerGuard> {
    let Some(path) = log_file else {
        let (_, guard) = tracing_appender::non_blocking(io::sink());
        return Ok(guard);
    };

    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_filter(filter);

    // A subscriber installed earlier (tests) keeps receiving events
    if tracing::dispatcher::has_been_set() {
        return Ok(guard);
    }
    match tracing_subscriber::registry().with(layer).try_init() {
        Ok(()) => Ok(guard),
        // lost a race with another installer
        Err(_) if tracing::dispatcher::has_been_set() => Ok(guard),
        Err(e) => Err(io::Error::other(e)),
    }
}
