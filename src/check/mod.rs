//! URL reachability checks under an SSO session.

mod engine;
mod error;

pub use engine::{CheckReport, DEFAULT_CONCURRENCY, UrlChecker};
pub use error::{CheckError, CheckerError, MAX_CONCURRENCY, MIN_CONCURRENCY};

// Note: no module-local Result aliases; use `Result<T, CheckerError>` explicitly.
