//! Rolling Logger
//!
//! Size-rotated file logging plus an in-memory circular buffer of the most
//! recent lines. Installs a global `tracing` subscriber; records emitted
//! through the `log` facade are bridged into it.

mod buffer;
mod file;

use std::fmt;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use thiserror::Error;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub use buffer::RingBuffer;
pub use file::RollingFile;

/// Lines kept in memory for `recent_lines`
static RECENT: OnceLock<Mutex<RingBuffer>> = OnceLock::new();

/// Logger errors
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Log file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logger already initialized")]
    AlreadyInitialized,
}

/// Logger settings
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Rotate the active file once it exceeds this many bytes
    pub max_bytes: u64,
    /// Rotated files kept besides the active one
    pub max_files: usize,
    /// Lines kept in the in-memory buffer
    pub buffer_lines: usize,
    /// Most verbose level recorded
    pub level: log::LevelFilter,
    /// Mirror records to stderr
    pub console: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            max_bytes: 2 * 1024 * 1024,
            max_files: 3,
            buffer_lines: 500,
            level: log::LevelFilter::Info,
            console: true,
        }
    }
}

/// Local wall-clock timestamps
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

fn tracing_level(level: log::LevelFilter) -> tracing_subscriber::filter::LevelFilter {
    use tracing_subscriber::filter::LevelFilter;
    match level {
        log::LevelFilter::Off => LevelFilter::OFF,
        log::LevelFilter::Error => LevelFilter::ERROR,
        log::LevelFilter::Warn => LevelFilter::WARN,
        log::LevelFilter::Info => LevelFilter::INFO,
        log::LevelFilter::Debug => LevelFilter::DEBUG,
        log::LevelFilter::Trace => LevelFilter::TRACE,
    }
}

/// Initialize logging into `log_dir/<app_name>.log` with default settings
pub fn init_logger(log_dir: PathBuf, app_name: &str) -> Result<(), LoggerError> {
    init_with(log_dir, app_name, LoggerConfig::default())
}

/// Initialize logging with explicit settings
pub fn init_with(log_dir: PathBuf, app_name: &str, config: LoggerConfig) -> Result<(), LoggerError> {
    let recent = RECENT.get_or_init(|| Mutex::new(RingBuffer::new(config.buffer_lines)));
    let file = RollingFile::open(log_dir, app_name, config.max_bytes, config.max_files)?
        .with_buffer(recent);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_timer(LocalTime)
        .with_writer(Mutex::new(file));
    let console_layer = config.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_timer(LocalTime)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(tracing_level(config.level))
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)?;

    tracing::info!(app = app_name, "Logger initialized");
    Ok(())
}

/// Record an informational message
pub fn info(message: &str) {
    tracing::info!("{}", message);
}

/// Record an error message
pub fn error(message: &str) {
    tracing::error!("{}", message);
}

/// The most recent log lines, oldest first
pub fn recent_lines() -> Vec<String> {
    match RECENT.get() {
        Some(recent) => recent.lock().unwrap_or_else(|e| e.into_inner()).lines(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_failure_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the log directory should be
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();

        let err = match RollingFile::open(blocker.join("logs"), "board", 16, 1) {
            Ok(_) => panic!("opened a log file under a regular file"),
            Err(e) => LoggerError::from(e),
        };
        assert!(matches!(err, LoggerError::Io(_)));
        assert!(err.to_string().starts_with("Log file error: "));
        assert!(std::error::Error::source(&err).is_some());
    }
}
