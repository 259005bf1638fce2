//! Logging infrastructure for the confman library.
//!
//! The library itself only talks to the [`log`] facade. This module provides
//! a small stderr backend for binaries, with three verbosity levels.

use std::env;
use std::fmt;

use log::{LevelFilter, Log, Metadata, Record};

/// Environment variable consulted by [`init_logger`] when no CLI flag is set.
pub const LOG_MODE_ENV: &str = "CONFMAN_LOG_MODE";

/// How much the stderr backend prints. `Quiet < Normal < Verbose`.
///
/// # Examples
///
/// ```
/// use confman::LogLevel;
///
/// assert!(LogLevel::Quiet < LogLevel::Normal);
/// assert!(LogLevel::Normal < LogLevel::Verbose);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Suppress all output.
    Quiet,
    /// Errors and warnings.
    Normal,
    /// Errors, warnings, info and debug messages.
    Verbose,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quiet => write!(f, "quiet"),
            Self::Normal => write!(f, "normal"),
            Self::Verbose => write!(f, "verbose"),
        }
    }
}

impl LogLevel {
    /// Reads a level name as written in `CONFMAN_LOG_MODE`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns a message naming the input if it is not a level.
    ///
    /// # Examples
    ///
    /// ```
    /// use confman::LogLevel;
    ///
    /// assert_eq!(LogLevel::parse("quiet").unwrap(), LogLevel::Quiet);
    /// assert_eq!(LogLevel::parse("VERBOSE").unwrap(), LogLevel::Verbose);
    /// assert!(LogLevel::parse("invalid").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "quiet" => Ok(Self::Quiet),
            "normal" => Ok(Self::Normal),
            "verbose" => Ok(Self::Verbose),
            _ => Err(format!("invalid log level: {s}")),
        }
    }

    /// The `log` filter corresponding to this level.
    #[must_use]
    pub const fn filter(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::Off,
            Self::Normal => LevelFilter::Warn,
            Self::Verbose => LevelFilter::Debug,
        }
    }
}

/// A stderr-based `log` backend.
///
/// # Examples
///
/// ```
/// use confman::{LogLevel, Logger};
/// use log::Log;
///
/// let logger = Logger::new(LogLevel::Normal);
/// assert!(logger.enabled(&log::Metadata::builder().level(log::Level::Warn).build()));
/// assert!(!logger.enabled(&log::Metadata::builder().level(log::Level::Debug).build()));
/// ```
pub struct Logger {
    level: LogLevel,
}

impl Logger {
    /// A backend printing at `level`.
    #[must_use]
    pub const fn new(level: LogLevel) -> Self {
        Self { level }
    }

    /// The configured level.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LogLevel::Normal)
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level.filter()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("{}: {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Picks a log level from CLI flags and the environment.
///
/// `--verbose` beats `--quiet`; without either flag a valid
/// `CONFMAN_LOG_MODE` applies, and anything else means [`LogLevel::Normal`].
#[must_use]
pub fn resolve_level(verbose: bool, quiet: bool) -> LogLevel {
    if verbose {
        return LogLevel::Verbose;
    }
    if quiet {
        return LogLevel::Quiet;
    }

    env::var(LOG_MODE_ENV)
        .ok()
        .and_then(|value| LogLevel::parse(&value).ok())
        .unwrap_or(LogLevel::Normal)
}

/// Installs the stderr logger as the global `log` backend.
///
/// Installing twice keeps the first backend but still applies the new
/// level filter. Returns the level that was applied.
///
/// # Examples
///
/// ```
/// use confman::{init_logger, LogLevel};
///
/// let level = init_logger(true, false);
/// assert_eq!(level, LogLevel::Verbose);
/// ```
pub fn init_logger(verbose: bool, quiet: bool) -> LogLevel {
    let level = resolve_level(verbose, quiet);
    // Already installed: only the filter changes.
    let _ = log::set_logger(Box::leak(Box::new(Logger::new(level))));
    log::set_max_level(level.filter());
    level
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    struct EnvGuard(Option<String>);

    impl EnvGuard {
        fn set(value: Option<&str>) -> Self {
            let saved = env::var(LOG_MODE_ENV).ok();
            match value {
                Some(v) => env::set_var(LOG_MODE_ENV, v),
                None => env::remove_var(LOG_MODE_ENV),
            }
            Self(saved)
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match self.0.take() {
                Some(v) => env::set_var(LOG_MODE_ENV, v),
                None => env::remove_var(LOG_MODE_ENV),
            }
        }
    }

    #[test]
    fn test_log_level_display_and_parse() {
        for level in [LogLevel::Quiet, LogLevel::Normal, LogLevel::Verbose] {
            assert_eq!(LogLevel::parse(&level.to_string()).unwrap(), level);
        }
        assert_eq!(LogLevel::parse("QuIeT").unwrap(), LogLevel::Quiet);
        assert!(LogLevel::parse("debug").is_err());
    }

    #[test]
    fn test_level_filters() {
        assert_eq!(LogLevel::Quiet.filter(), LevelFilter::Off);
        assert_eq!(LogLevel::Normal.filter(), LevelFilter::Warn);
        assert_eq!(LogLevel::Verbose.filter(), LevelFilter::Debug);
    }

    #[test]
    fn test_logger_enabled_respects_level() {
        let quiet = Logger::new(LogLevel::Quiet);
        let meta = Metadata::builder().level(log::Level::Error).build();
        assert!(!quiet.enabled(&meta));

        let verbose = Logger::new(LogLevel::Verbose);
        let meta = Metadata::builder().level(log::Level::Debug).build();
        assert!(verbose.enabled(&meta));
        let meta = Metadata::builder().level(log::Level::Trace).build();
        assert!(!verbose.enabled(&meta));
    }

    #[test]
    fn test_default_backend_prints_warnings_only() {
        let logger = Logger::default();
        assert_eq!(logger.level(), LogLevel::Normal);
        assert!(logger.enabled(&Metadata::builder().level(log::Level::Warn).build()));
        assert!(!logger.enabled(&Metadata::builder().level(log::Level::Info).build()));
    }

    #[test]
    #[serial]
    fn test_resolve_level_flags() {
        let _guard = EnvGuard::set(Some("quiet"));
        assert_eq!(resolve_level(true, false), LogLevel::Verbose);
        assert_eq!(resolve_level(false, true), LogLevel::Quiet);
        assert_eq!(resolve_level(true, true), LogLevel::Verbose);
    }

    #[test]
    #[serial]
    fn test_resolve_level_from_env() {
        let _guard = EnvGuard::set(Some("verbose"));
        assert_eq!(resolve_level(false, false), LogLevel::Verbose);
    }

    #[test]
    #[serial]
    fn test_init_logger_twice_updates_filter() {
        let _guard = EnvGuard::set(None);
        assert_eq!(init_logger(false, true), LogLevel::Quiet);
        assert_eq!(log::max_level(), LevelFilter::Off);

        assert_eq!(init_logger(true, false), LogLevel::Verbose);
        assert_eq!(log::max_level(), LevelFilter::Debug);
    }

    #[test]
    #[serial]
    fn test_resolve_level_defaults() {
        let _guard = EnvGuard::set(None);
        assert_eq!(resolve_level(false, false), LogLevel::Normal);

        let _guard = EnvGuard::set(Some("invalid"));
        assert_eq!(resolve_level(false, false), LogLevel::Normal);
    }
}
