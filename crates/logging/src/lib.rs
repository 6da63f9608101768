//! DropCraft Logging
//!
//! One `tracing-subscriber` setup shared by the `dropcraft` binary and the
//! test suites. `RUST_LOG` always overrides the level chosen here.
//!
//! ```no_run
//! use dropcraft_logging::{init, LogLevel};
//!
//! // `-v` on the command line
//! init(LogLevel::from_verbose(true));
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Unknown log level: {0}")]
    UnknownLevel(String),

    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Log level for the application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    /// Root changes and successful claims (default)
    #[default]
    Info,
    /// Proof folding and per-transfer detail
    Debug,
    Trace,
}

impl LogLevel {
    /// `false` → `Info`, `true` → `Debug`
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Self::Debug
        } else {
            Self::Info
        }
    }

    /// `0` → `Info`, `1` → `Debug`, `2+` → `Trace`
    pub fn from_verbosity(count: u8) -> Self {
        match count {
            0 => Self::Info,
            1 => Self::Debug,
            _ => Self::Trace,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.as_str()))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            other => Err(LoggingError::UnknownLevel(other.to_string())),
        }
    }
}

/// Initialize logging with the specified level.
///
/// # Panics
///
/// Panics if a global subscriber is already set. Use [`try_init`] to
/// handle that case.
pub fn init(level: LogLevel) {
    if let Err(e) = try_init(level) {
        panic!("Failed to initialize logging: {}", e);
    }
}

/// Initialize logging, failing if a global subscriber is already set.
pub fn try_init(level: LogLevel) -> Result<(), LoggingError> {
    init_with_target(level, false)
}

/// Initialize logging, optionally printing the emitting module path.
pub fn init_with_target(level: LogLevel, show_target: bool) -> Result<(), LoggingError> {
    tracing_subscriber::fmt()
        .with_env_filter(level.filter())
        .with_target(show_target)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
}

/// Route debug output to the test harness. Safe to call from every test.
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
