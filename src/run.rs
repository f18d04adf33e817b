//! End-to-end run: load the URL list, log in, check every URL, report.
//!
//! Fatal errors (configuration, handshake, missing session) stop the run
//! before any URL is checked. Per-URL failures are collected and do not
//! change the exit status.

use std::process::ExitCode;

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::auth::{AuthError, Authenticator, SessionCookie};
use crate::check::{CheckError, CheckReport, CheckerError, UrlChecker};
use crate::config::{ConfigError, Settings, load_url_list};
use crate::report::Reporter;

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Settings are invalid or the URL list could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The SSO handshake failed.
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// The handshake completed but the server set no session cookie.
    #[error("Not authorized: SSO login did not set the sso_session cookie")]
    NotAuthorized,

    /// The URL checker could not be set up.
    #[error("checker setup failed: {0}")]
    Checker(#[from] CheckerError),
}

/// Final result of a run; produced once per invocation.
#[derive(Debug)]
pub enum RunOutcome {
    /// The run stopped on a fatal error.
    Fatal(RunError),
    /// Every URL was checked; failures, if any, are in the report.
    Completed(CheckReport),
}

impl RunOutcome {
    /// Returns true for fatal outcomes.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }

    /// Returns the fatal error, if any.
    #[must_use]
    pub fn fatal_error(&self) -> Option<&RunError> {
        match self {
            Self::Fatal(error) => Some(error),
            Self::Completed(_) => None,
        }
    }

    /// Returns the check report for completed runs.
    #[must_use]
    pub fn report(&self) -> Option<&CheckReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Fatal(_) => None,
        }
    }

    /// Per-URL failures in completion order (empty for fatal outcomes).
    #[must_use]
    pub fn errors(&self) -> &[CheckError] {
        match self {
            Self::Completed(report) => report.errors(),
            Self::Fatal(_) => &[],
        }
    }

    /// Maps the outcome to a process exit status.
    ///
    /// Only fatal errors fail the process; per-URL failures still exit 0.
    #[must_use]
    pub fn exit_status(&self) -> ProcessExit {
        if self.is_fatal() {
            ProcessExit::Failure
        } else {
            ProcessExit::Success
        }
    }
}

/// Process exit outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessExit {
    /// Exit code 0.
    Success,
    /// Exit code 1.
    Failure,
}

impl ProcessExit {
    /// Numeric exit code.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        ExitCode::from(exit.code())
    }
}

/// Loads the URL list from `settings.urls_path` and runs the sweep.
///
/// The reporter receives `on_finish` exactly once.
#[instrument(skip(settings, reporter), fields(sso_url = %settings.sso_url, urls_path = %settings.urls_path.display()))]
pub async fn run(settings: &Settings, reporter: &dyn Reporter) -> RunOutcome {
    let result = match prepare(settings) {
        Ok(urls) => execute(settings, &urls, reporter).await,
        Err(e) => Err(e),
    };
    finish(result, reporter)
}

/// Runs the sweep over an already loaded URL list.
///
/// The reporter receives `on_finish` exactly once.
#[instrument(skip(settings, urls, reporter), fields(sso_url = %settings.sso_url, total = urls.len()))]
pub async fn run_with_urls(
    settings: &Settings,
    urls: &[String],
    reporter: &dyn Reporter,
) -> RunOutcome {
    let result = match settings.validate() {
        Ok(()) => execute(settings, urls, reporter).await,
        Err(e) => Err(e.into()),
    };
    finish(result, reporter)
}

fn prepare(settings: &Settings) -> Result<Vec<String>, RunError> {
    settings.validate()?;
    let urls = load_url_list(&settings.urls_path)?;
    info!(count = urls.len(), "loaded URL list");
    Ok(urls)
}

async fn execute(
    settings: &Settings,
    urls: &[String],
    reporter: &dyn Reporter,
) -> Result<CheckReport, RunError> {
    let session = login(settings).await?;
    let checker = UrlChecker::new(settings.concurrency, settings.timeouts)?;
    Ok(checker.check_urls(urls, &session, reporter).await)
}

async fn login(settings: &Settings) -> Result<SessionCookie, RunError> {
    let authenticator = Authenticator::new(settings.sso_url.as_str(), settings.timeouts)?;
    authenticator
        .authenticate(&settings.credentials)
        .await?
        .filter(|session| !session.is_empty())
        .ok_or(RunError::NotAuthorized)
}

fn finish(result: Result<CheckReport, RunError>, reporter: &dyn Reporter) -> RunOutcome {
    let outcome = match result {
        Ok(report) => RunOutcome::Completed(report),
        Err(error) => {
            warn!(error = %error, "run aborted");
            RunOutcome::Fatal(error)
        }
    };
    reporter.on_finish(&outcome);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::HandshakeStep;

    #[test]
    fn test_exit_status_success_when_completed_clean() {
        let outcome = RunOutcome::Completed(CheckReport::default());
        assert_eq!(outcome.exit_status(), ProcessExit::Success);
        assert!(outcome.errors().is_empty());
    }

    #[test]
    fn test_exit_status_failure_when_fatal() {
        let outcome = RunOutcome::Fatal(RunError::NotAuthorized);
        assert_eq!(outcome.exit_status(), ProcessExit::Failure);
        assert!(outcome.is_fatal());
        assert!(outcome.report().is_none());
        assert!(outcome.errors().is_empty());
    }

    #[test]
    fn test_process_exit_codes() {
        assert_eq!(ProcessExit::Success.code(), 0);
        assert_eq!(ProcessExit::Failure.code(), 1);
    }

    #[test]
    fn test_run_error_display_wraps_source() {
        let error = RunError::from(AuthError::rejected(
            HandshakeStep::FetchToken,
            "https://sso.example.com/login",
            502,
        ));
        let msg = error.to_string();
        assert!(msg.starts_with("authentication failed"), "got: {msg}");
        assert!(msg.contains("502"));

        assert!(RunError::NotAuthorized.to_string().contains("sso_session"));
    }

    #[tokio::test]
    async fn test_run_invalid_settings_is_fatal_before_network() {
        let settings = Settings {
            concurrency: 0,
            ..Settings::default()
        };
        let outcome = run_with_urls(
            &settings,
            &["https://example.com".to_string()],
            &crate::report::NoopReporter,
        )
        .await;
        assert!(matches!(
            outcome.fatal_error(),
            Some(RunError::Config(ConfigError::Invalid {
                field: "concurrency",
                ..
            }))
        ));
    }
}
