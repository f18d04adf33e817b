//! Bounded-concurrency URL checker.
//!
//! This module provides the [`UrlChecker`] which sends one authenticated GET
//! per URL using a semaphore-based concurrency control pattern. Failures are
//! collected through a channel and handed back to the caller; nothing is
//! retried.
//!
//! # Example
//!
//! ```no_run
//! use url_checker_core::{HttpTimeouts, NoopReporter, SessionCookie, UrlChecker};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let checker = UrlChecker::new(10, HttpTimeouts::default())?;
//! let urls = vec!["https://intranet.example.com/".to_string()];
//! let report = checker
//!     .check_urls(&urls, &SessionCookie::new("abc"), &NoopReporter)
//!     .await;
//! println!("Checked: {}, Failed: {}", report.checked(), report.failed());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use reqwest::Client;
use reqwest::header::COOKIE;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info, instrument, warn};

use super::error::{CheckError, CheckerError, MAX_CONCURRENCY, MIN_CONCURRENCY};
use crate::auth::SessionCookie;
use crate::http::{ClientOptions, HttpTimeouts, build_client};
use crate::report::Reporter;

/// Default number of simultaneously in-flight checks.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Result of a sweep over a URL list.
///
/// Every input URL yields exactly one terminal outcome: it either passed
/// silently or appears once in [`errors`](Self::errors).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    checked: usize,
    errors: Vec<CheckError>,
    peak_in_flight: usize,
}

impl CheckReport {
    /// Number of URLs that reached a terminal outcome.
    #[must_use]
    pub fn checked(&self) -> usize {
        self.checked
    }

    /// Number of URLs that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.errors.len()
    }

    /// Number of URLs that loaded successfully.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.checked.saturating_sub(self.errors.len())
    }

    /// Failures in completion order.
    #[must_use]
    pub fn errors(&self) -> &[CheckError] {
        &self.errors
    }

    /// Consumes the report, returning the failures.
    #[must_use]
    pub fn into_errors(self) -> Vec<CheckError> {
        self.errors
    }

    /// Highest number of requests observed running at the same time.
    #[must_use]
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight
    }
}

/// Tracks the number of running checks and the high-water mark.
#[derive(Debug, Default)]
struct InFlightGauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlightGauge {
    fn enter(self: &Arc<Self>) -> InFlightGuard {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlightGuard {
            gauge: Arc::clone(self),
        }
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

struct InFlightGuard {
    gauge: Arc<InFlightGauge>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.gauge.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Checker that verifies URLs under an SSO session.
///
/// # Concurrency Model
///
/// - Each check runs in its own Tokio task
/// - A semaphore permit is acquired, in input order, before each task is spawned
/// - Permits are released automatically when checks complete (RAII)
/// - Failures are sent over an mpsc channel and drained once every task is joined
///
/// The checker's client has no cookie store: the session is attached
/// explicitly as a `Cookie` header on every request.
#[derive(Debug)]
pub struct UrlChecker {
    client: Client,
    semaphore: Arc<Semaphore>,
    concurrency: usize,
}

impl UrlChecker {
    /// Creates a checker with the given concurrency limit and timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`CheckerError::InvalidConcurrency`] if the value is outside
    /// the valid range (1-100), or [`CheckerError::ClientBuild`] if the HTTP
    /// client cannot be built.
    #[instrument(level = "debug")]
    pub fn new(concurrency: usize, timeouts: HttpTimeouts) -> Result<Self, CheckerError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(CheckerError::InvalidConcurrency { value: concurrency });
        }

        let client = build_client(ClientOptions {
            timeouts,
            cookie_jar: None,
            follow_redirects: true,
        })
        .map_err(CheckerError::ClientBuild)?;

        Ok(Self {
            client,
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
        })
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Checks every URL and returns the failures.
    ///
    /// The reporter is told about each URL as it is dispatched. This method
    /// returns only after every URL has reached a terminal outcome; an
    /// individual failure never stops the sweep.
    #[instrument(skip(self, urls, session, reporter), fields(total = urls.len(), concurrency = self.concurrency))]
    pub async fn check_urls(
        &self,
        urls: &[String],
        session: &SessionCookie,
        reporter: &dyn Reporter,
    ) -> CheckReport {
        let total = urls.len();
        let cookie_header: Arc<str> = Arc::from(session.header_value());
        let gauge = Arc::new(InFlightGauge::default());
        let (tx, mut rx) = mpsc::unbounded_channel::<CheckError>();
        let mut handles = Vec::with_capacity(total);

        info!("starting URL checks");

        for (index, url) in urls.iter().enumerate() {
            // Acquire semaphore permit (waits while at the concurrency limit)
            let permit = match Arc::clone(&self.semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    warn!(url = %url, error = %e, "semaphore closed; recording check as aborted");
                    let _ = tx.send(CheckError::aborted(url.as_str(), e));
                    continue;
                }
            };

            reporter.on_dispatch(index + 1, total, url);
            debug!(seq = index + 1, url = %url, "dispatching check");

            let client = self.client.clone();
            let cookie_header = Arc::clone(&cookie_header);
            let gauge = Arc::clone(&gauge);
            let tx = tx.clone();
            let task_url = url.clone();

            handles.push((
                url.clone(),
                tokio::spawn(async move {
                    // Permit is dropped when this block exits (RAII)
                    let _permit = permit;
                    let _in_flight = gauge.enter();

                    if let Err(error) = check_url(&client, &task_url, &cookie_header).await {
                        // Receiver outlives every task; a failed send is unreachable.
                        let _ = tx.send(error);
                    }
                }),
            ));
        }

        debug!(task_count = handles.len(), "waiting for checks to complete");

        for (url, handle) in handles {
            if let Err(e) = handle.await {
                warn!(url = %url, error = %e, "check task panicked");
                let _ = tx.send(CheckError::aborted(url, e));
            }
        }
        drop(tx);

        let mut errors = Vec::new();
        while let Some(error) = rx.recv().await {
            errors.push(error);
        }

        let report = CheckReport {
            checked: total,
            errors,
            peak_in_flight: gauge.peak(),
        };
        info!(
            checked = report.checked(),
            passed = report.passed(),
            failed = report.failed(),
            peak_in_flight = report.peak_in_flight(),
            "URL checks complete"
        );
        report
    }
}

/// Sends one authenticated GET and classifies the outcome.
#[instrument(level = "debug", skip(client, cookie_header))]
async fn check_url(client: &Client, url: &str, cookie_header: &str) -> Result<(), CheckError> {
    let response = client
        .get(url)
        .header(COOKIE, cookie_header)
        .send()
        .await
        .map_err(|e| {
            warn!(url = %url, error = %e, "check request failed");
            CheckError::transport(url, &e)
        })?;

    let status = response.status();
    if status.is_success() {
        debug!(status = status.as_u16(), "url loaded");
        Ok(())
    } else {
        warn!(url = %url, status = status.as_u16(), "url returned error status");
        Err(CheckError::http_status(url, status))
    }
}
