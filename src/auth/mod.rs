//! SSO authentication.
//!
//! This module performs the cookie-based login handshake and exposes the
//! `Set-Cookie` parser it relies on.

mod authenticator;
mod cookies;
mod error;

pub use authenticator::{
    Authenticator, Credentials, SSO_SESSION_COOKIE, SSO_TOKEN_COOKIE, SessionCookie,
};
pub use cookies::{CookieJar, extract_cookies, parse_set_cookie};
pub use error::{AuthError, HandshakeStep};
