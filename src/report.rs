//! Progress and result reporting.
//!
//! The checker notifies a [`Reporter`] as each URL is dispatched, and the run
//! hands it the final [`RunOutcome`] exactly once. [`ConsoleReporter`] prints
//! both in the tool's plain-text format; [`NoopReporter`] discards them.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::run::RunOutcome;

/// Headline printed above the failure table.
pub const FAILURE_HEADLINE: &str = "The following URLs were not loaded due to errors:";

/// Line printed when a run completes without a fatal error.
pub const FINISHED_LINE: &str = "Finished!";

/// Sink for progress and result notifications.
pub trait Reporter: Send + Sync {
    /// Called when the check for `url` starts; `seq` is 1-based, in input order.
    fn on_dispatch(&self, seq: usize, total: usize, url: &str);

    /// Called once with the final outcome of a run.
    fn on_finish(&self, outcome: &RunOutcome);
}

/// Reporter that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn on_dispatch(&self, _seq: usize, _total: usize, _url: &str) {}

    fn on_finish(&self, _outcome: &RunOutcome) {}
}

/// Plain-text reporter writing progress and the failure table to `out` and
/// fatal errors to `err`.
///
/// Quiet mode drops the per-URL progress lines and the final success line;
/// the failure table and fatal errors are always written.
#[derive(Debug)]
pub struct ConsoleReporter<O: Write + Send = io::Stdout, E: Write + Send = io::Stderr> {
    out: Mutex<O>,
    err: Mutex<E>,
    quiet: bool,
}

impl ConsoleReporter {
    /// Creates a reporter bound to the process stdout and stderr.
    #[must_use]
    pub fn stdio(quiet: bool) -> Self {
        Self::new(io::stdout(), io::stderr(), quiet)
    }
}

impl<O: Write + Send, E: Write + Send> ConsoleReporter<O, E> {
    /// Creates a reporter over arbitrary writers.
    #[must_use]
    pub fn new(out: O, err: E, quiet: bool) -> Self {
        Self {
            out: Mutex::new(out),
            err: Mutex::new(err),
            quiet,
        }
    }

    /// Returns the underlying writers.
    pub fn into_inner(self) -> (O, E) {
        (
            self.out.into_inner().unwrap_or_else(PoisonError::into_inner),
            self.err.into_inner().unwrap_or_else(PoisonError::into_inner),
        )
    }

    fn write_out(&self, line: fmt::Arguments<'_>) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "{line}") {
            debug!(error = %e, "failed to write report line");
        }
    }

    fn write_err(&self, line: fmt::Arguments<'_>) {
        let mut err = self.err.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(err, "{line}") {
            debug!(error = %e, "failed to write report line");
        }
    }
}

impl<O: Write + Send, E: Write + Send> Reporter for ConsoleReporter<O, E> {
    fn on_dispatch(&self, _seq: usize, _total: usize, url: &str) {
        if !self.quiet {
            self.write_out(format_args!("=> {url}"));
        }
    }

    fn on_finish(&self, outcome: &RunOutcome) {
        let errors = outcome.errors();
        if !errors.is_empty() {
            self.write_out(format_args!("\n{FAILURE_HEADLINE}"));
            for error in errors {
                self.write_out(format_args!("{error}"));
            }
        }

        match outcome {
            RunOutcome::Fatal(error) => self.write_err(format_args!("Error: {error}")),
            RunOutcome::Completed(_) => {
                if !self.quiet {
                    self.write_out(format_args!("\n{FINISHED_LINE}"));
                }
            }
        }
    }
}
