//! Error types for the SSO handshake.

use std::fmt;

use thiserror::Error;

/// Which request of the two-step handshake an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStep {
    /// Initial GET that collects the anti-forgery token cookie.
    FetchToken,
    /// Form POST carrying the credentials.
    SubmitCredentials,
}

impl fmt::Display for HandshakeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchToken => f.write_str("token request"),
            Self::SubmitCredentials => f.write_str("credential submit"),
        }
    }
}

/// Errors that abort the SSO handshake.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The request could not complete (DNS resolution, connection refused, TLS, ...).
    #[error("network error during {step} to {url}: {source}")]
    Network {
        /// Handshake step that failed.
        step: HandshakeStep,
        /// SSO endpoint.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The request timed out before a response arrived.
    #[error("timeout during {step} to {url}")]
    Timeout {
        /// Handshake step that failed.
        step: HandshakeStep,
        /// SSO endpoint.
        url: String,
    },

    /// The SSO server answered with a status the handshake does not accept.
    #[error("SSO server returned HTTP {status} during {step} to {url}")]
    Rejected {
        /// Handshake step that failed.
        step: HandshakeStep,
        /// SSO endpoint.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The handshake HTTP client could not be constructed.
    #[error("failed to build SSO HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl AuthError {
    /// Maps a reqwest transport error to `Timeout` or `Network`.
    pub fn transport(step: HandshakeStep, url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                step,
                url: url.into(),
            }
        } else {
            Self::Network {
                step,
                url: url.into(),
                source,
            }
        }
    }

    /// Creates a rejected-status error.
    pub fn rejected(step: HandshakeStep, url: impl Into<String>, status: u16) -> Self {
        Self::Rejected {
            step,
            url: url.into(),
            status,
        }
    }

    /// Returns true for failures where the request never produced a response.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout { .. })
    }

    /// Returns the HTTP status for rejected answers.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
