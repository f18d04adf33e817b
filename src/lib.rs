//! SSO URL Checker Core Library
//!
//! This library logs in through a single-sign-on form, keeps the resulting
//! session cookie, and verifies that a list of URLs loads under that session
//! with a bounded number of requests in flight.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`auth`] - `Set-Cookie` parsing and the two-step SSO login handshake
//! - [`check`] - Bounded-concurrency URL checks and failure collection
//! - [`config`] - Settings resolution and URL list loading
//! - [`report`] - Progress and result reporting
//! - [`run`] - End-to-end orchestration and exit status

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod check;
pub mod config;
pub mod http;
pub mod report;
pub mod run;
mod user_agent;

// Re-export commonly used types
pub use auth::{
    AuthError, Authenticator, CookieJar, Credentials, SessionCookie, extract_cookies,
    parse_set_cookie,
};
pub use check::{CheckError, CheckReport, CheckerError, DEFAULT_CONCURRENCY, UrlChecker};
pub use config::{ConfigError, Settings, load_url_list};
pub use http::HttpTimeouts;
pub use report::{ConsoleReporter, NoopReporter, Reporter};
pub use run::{ProcessExit, RunError, RunOutcome, run, run_with_urls};
