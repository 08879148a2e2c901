//! Tracing setup.
//!
//! Page routines report what the browser script printed to its console:
//! fragment failures at `error`, a schedule that is not ready at `warn`,
//! boot progress at `info`. Everything goes to stderr so page output on
//! stdout stays clean.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much the binary reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Boot progress and on-air changes.
    #[default]
    Normal,
    /// Every fragment, fetch and scroll request.
    Verbose,
    /// Resource reads and timer ticks as well.
    Trace,
}

impl Verbosity {
    /// Most detailed level let through for this crate.
    #[must_use]
    pub fn level(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::ERROR,
            Self::Normal => LevelFilter::INFO,
            Self::Verbose => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }

    /// Filter directive: this crate at [`Self::level`], dependencies at
    /// `warn` unless quiet.
    #[must_use]
    pub fn directive(self) -> String {
        let (deps, own) = match self {
            Self::Quiet => ("error", "error"),
            Self::Normal => ("warn", "info"),
            Self::Verbose => ("warn", "debug"),
            Self::Trace => ("warn", "trace"),
        };
        format!("{deps},tv45={own}")
    }
}

/// Install the global subscriber. `RUST_LOG`, when set, replaces the
/// directive derived from `verbosity`. Later calls do nothing.
///
/// ```no_run
/// use tv45::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(verbosity >= Verbosity::Verbose)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

/// Capture warnings through the test harness.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(Verbosity::Quiet.level(), LevelFilter::ERROR);
        assert_eq!(Verbosity::Normal.level(), LevelFilter::INFO);
        assert_eq!(Verbosity::Verbose.level(), LevelFilter::DEBUG);
        assert_eq!(Verbosity::Trace.level(), LevelFilter::TRACE);
        assert_eq!(Verbosity::default(), Verbosity::Normal);
    }

    #[test]
    fn test_directive() {
        assert_eq!(Verbosity::Normal.directive(), "warn,tv45=info");
        assert_eq!(Verbosity::Quiet.directive(), "error,tv45=error");
        assert_eq!(Verbosity::Trace.directive(), "warn,tv45=trace");
    }

    #[test]
    fn test_init_twice() {
        init_logging(Verbosity::Quiet);
        init_logging(Verbosity::Trace);
    }
}
