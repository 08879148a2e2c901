//! Error types for tv45.
//!
//! Page routines never let these escape to the host: loaders and data
//! initializers log them and degrade. The binary and the configuration layer
//! are the only places where an `Error` ends a run.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while fetching, configuring or driving the page.
#[derive(Error, Debug)]
pub enum Error {
    /// A resource answered with a non-success status.
    #[error("failed to fetch {path}: status {status}")]
    FetchStatus {
        /// Path of the requested resource, relative to the site source.
        path: String,
        /// HTTP status code (404 for files missing from a directory source).
        status: u16,
    },

    /// The HTTP client failed before a status was available.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A site source, resource path or form action is not a usable URL.
    #[error("invalid URL '{value}': {source}")]
    InvalidUrl {
        /// The offending path or URL.
        value: String,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// The fetcher cannot do this, e.g. post a form to a directory.
    #[error("not supported here: {operation}")]
    Unsupported {
        /// What was attempted.
        operation: String,
    },

    /// Layering defaults, file and environment failed.
    #[error("cannot read configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// A configured value is out of range.
    #[error("configuration rejected: {message}")]
    ConfigValidation {
        /// Which value and why.
        message: String,
    },

    /// A data file is not the JSON shape the page expects.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A schedule time was not in `HH:MM` 24-hour form.
    #[error("invalid time '{value}', expected HH:MM")]
    InvalidTime {
        /// The rejected value.
        value: String,
    },

    /// A line fed to the live loop is not a page event.
    #[error("unrecognized page event: {line}")]
    InvalidEvent {
        /// The rejected line.
        line: String,
    },

    /// Reading a site file failed for a reason other than absence.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The assembled page could not be written.
    #[error("failed to write {path}: {source}")]
    OutputWrite {
        /// Destination path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// An unsupported-operation error.
    #[must_use]
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Whether the resource simply does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::FetchStatus { status: 404, .. })
    }
}
