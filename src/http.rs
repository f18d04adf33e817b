//! HTTP client construction shared by the authenticator and the URL checker.
//!
//! Both components talk to the network through `reqwest`, but with different
//! needs: the handshake's two requests share one cookie jar, and only the
//! credential POST must see redirects unfollowed; checks use no jar at all.
//! [`ClientOptions`] captures those differences so every client is built
//! from one place with the same timeouts and User-Agent.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder};
use tracing::debug;

use crate::user_agent;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (60 seconds); check responses are pages, not files.
pub const READ_TIMEOUT_SECS: u64 = 60;

/// Connect/read timeouts applied to a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// Connect timeout in seconds.
    pub connect_secs: u64,
    /// Whole-request timeout in seconds.
    pub read_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect_secs: CONNECT_TIMEOUT_SECS,
            read_secs: READ_TIMEOUT_SECS,
        }
    }
}

/// How a client should treat cookies and redirects.
#[derive(Debug, Clone)]
pub(crate) struct ClientOptions {
    pub(crate) timeouts: HttpTimeouts,
    /// Jar that persists `Set-Cookie` values and replays them on later
    /// requests; may be shared between clients.
    pub(crate) cookie_jar: Option<Arc<Jar>>,
    /// Follow redirects (reqwest default policy) instead of returning them.
    pub(crate) follow_redirects: bool,
}

/// Builds a reqwest client for the given options.
pub(crate) fn build_client(options: ClientOptions) -> Result<Client, reqwest::Error> {
    debug!(
        connect_secs = options.timeouts.connect_secs,
        read_secs = options.timeouts.read_secs,
        cookie_jar = options.cookie_jar.is_some(),
        follow_redirects = options.follow_redirects,
        "building HTTP client"
    );
    base_client_builder(options).build()
}

fn base_client_builder(options: ClientOptions) -> ClientBuilder {
    let mut builder = Client::builder()
        .connect_timeout(Duration::from_secs(options.timeouts.connect_secs))
        .timeout(Duration::from_secs(options.timeouts.read_secs))
        .gzip(true)
        .user_agent(user_agent::default_user_agent());
    if let Some(jar) = options.cookie_jar {
        builder = builder.cookie_provider(jar);
    }
    if !options.follow_redirects {
        builder = builder.redirect(Policy::none());
    }
    builder
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts() {
        let timeouts = HttpTimeouts::default();
        assert_eq!(timeouts.connect_secs, 30);
        assert_eq!(timeouts.read_secs, 60);
    }

    #[test]
    fn test_build_client_for_each_mode() {
        let jar = Arc::new(Jar::default());
        for (cookie_jar, follow_redirects) in [
            (Some(Arc::clone(&jar)), false),
            (Some(Arc::clone(&jar)), true),
            (None, true),
        ] {
            let options = ClientOptions {
                timeouts: HttpTimeouts::default(),
                cookie_jar,
                follow_redirects,
            };
            assert!(build_client(options).is_ok());
        }
    }
}
