//! Shared User-Agent string for handshake and check HTTP clients.
//!
//! Single source for the UA format so login traffic and URL checks identify
//! the tool the same way in server logs.

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/fierce/sso-url-checker";

/// Default User-Agent for every request the tool sends.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("url-checker/{version} (+{PROJECT_UA_URL})")
}
