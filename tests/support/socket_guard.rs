//! Localhost socket helpers for tests that talk to a mock SSO server.

use std::net::TcpListener;

use wiremock::MockServer;

/// Set to `1`/`true`/`yes` to fail instead of skipping when sockets are unavailable.
const REQUIRE_SOCKETS_ENV: &str = "URL_CHECKER_REQUIRE_SOCKET_TESTS";

fn sockets_required() -> bool {
    std::env::var(REQUIRE_SOCKETS_ENV)
        .is_ok_and(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

/// Starts a mock server, or returns `None` when localhost cannot be bound
/// (sandboxed CI) and sockets are not required.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if let Err(e) = TcpListener::bind("127.0.0.1:0") {
        assert!(
            !sockets_required(),
            "cannot bind a localhost socket ({e}) but {REQUIRE_SOCKETS_ENV} is set"
        );
        eprintln!("skipping mock-server test: cannot bind a localhost socket ({e})");
        return None;
    }
    Some(MockServer::start().await)
}

/// Returns a localhost URL whose port refuses connections.
pub fn refused_url(path: &str) -> String {
    let port = TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .map_or(9, |addr| addr.port());
    format!("http://127.0.0.1:{port}{path}")
}
