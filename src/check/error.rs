//! Error types for the URL checker.

use std::fmt;

use thiserror::Error;

/// A URL that did not load, as recorded by a sweep.
///
/// Individual check failures never abort the sweep; they are collected and
/// returned in completion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckError {
    /// The URL that failed.
    pub url: String,
    /// HTTP status code, when the server answered at all.
    pub status: Option<u16>,
    /// Human-readable failure description.
    pub message: String,
}

impl CheckError {
    /// Records a non-success HTTP answer; the message is the canonical reason.
    #[must_use]
    pub fn http_status(url: impl Into<String>, status: reqwest::StatusCode) -> Self {
        Self {
            url: url.into(),
            status: Some(status.as_u16()),
            message: status
                .canonical_reason()
                .unwrap_or("Unknown Status")
                .to_string(),
        }
    }

    /// Records a transport failure (no response).
    #[must_use]
    pub fn transport(url: impl Into<String>, source: &reqwest::Error) -> Self {
        let message = if source.is_timeout() {
            "request timed out".to_string()
        } else {
            source.to_string()
        };
        Self {
            url: url.into(),
            status: None,
            message,
        }
    }

    /// Records a check task that ended without producing an outcome.
    #[must_use]
    pub fn aborted(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self {
            url: url.into(),
            status: None,
            message: format!("check task aborted: {reason}"),
        }
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{status}\t{}\t{}", self.message, self.url),
            None => write!(f, "-\t{}\t{}", self.message, self.url),
        }
    }
}

/// Errors raised while setting up a checker.
#[derive(Debug, Error)]
pub enum CheckerError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// The check HTTP client could not be constructed.
    #[error("failed to build check HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

/// Minimum allowed concurrency value.
pub const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
pub const MAX_CONCURRENCY: usize = 100;
