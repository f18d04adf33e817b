//! Two-step SSO login handshake.
//!
//! 1. `GET <sso_url>`: the server sets the anti-forgery cookie `sso_token`.
//! 2. `POST <sso_url>` with a form body (`login`, `password`, `_csrf`,
//!    `return_to`) and redirects disabled. A correct login answers
//!    `303 See Other` and sets the `sso_session` cookie.
//!
//! The GET follows redirects to reach the form; the POST never does. Both
//! clients share one cookie jar, so the token cookie is replayed on the POST
//! as a browser would.

use std::fmt;
use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, instrument};
use url::form_urlencoded;

use super::cookies::{CookieJar, extract_cookies};
use super::error::{AuthError, HandshakeStep};
use crate::http::{ClientOptions, HttpTimeouts, build_client};

/// Cookie carrying the anti-forgery token set by the login form.
pub const SSO_TOKEN_COOKIE: &str = "sso_token";

/// Cookie carrying the authenticated session.
pub const SSO_SESSION_COOKIE: &str = "sso_session";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Login name and password for the SSO form.
///
/// The password is redacted in Debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    login: String,
    password: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }

    /// Returns the login name.
    #[must_use]
    pub fn login(&self) -> &str {
        &self.login
    }

    /// Returns the password.
    ///
    /// Sensitive: never log the return value.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Value of the `sso_session` cookie obtained by a successful login.
///
/// Valid for the rest of the run; never refreshed.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCookie(String);

impl SessionCookie {
    /// Wraps a raw cookie value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw cookie value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }

    /// Returns true if the server set the cookie to an empty value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders the `Cookie` request header value, `sso_session=<value>`.
    #[must_use]
    pub fn header_value(&self) -> String {
        format!("{SSO_SESSION_COOKIE}={}", self.0)
    }
}

impl fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionCookie").field(&"[REDACTED]").finish()
    }
}

/// Performs the SSO login handshake against one endpoint.
#[derive(Debug, Clone)]
pub struct Authenticator {
    /// Fetches the login form; follows redirects.
    form_client: Client,
    /// Submits credentials; redirects are returned, not followed.
    submit_client: Client,
    sso_url: String,
}

impl Authenticator {
    /// Creates an authenticator for `sso_url` with a fresh cookie jar.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ClientBuild`] if an HTTP client cannot be built.
    pub fn new(sso_url: impl Into<String>, timeouts: HttpTimeouts) -> Result<Self, AuthError> {
        let jar = Arc::new(Jar::default());
        let form_client = build_client(ClientOptions {
            timeouts,
            cookie_jar: Some(Arc::clone(&jar)),
            follow_redirects: true,
        })
        .map_err(AuthError::ClientBuild)?;
        let submit_client = build_client(ClientOptions {
            timeouts,
            cookie_jar: Some(jar),
            follow_redirects: false,
        })
        .map_err(AuthError::ClientBuild)?;
        Ok(Self {
            form_client,
            submit_client,
            sso_url: sso_url.into(),
        })
    }

    /// Returns the SSO endpoint used for both handshake requests.
    #[must_use]
    pub fn sso_url(&self) -> &str {
        &self.sso_url
    }

    /// Logs in and returns the session cookie the server set, if any.
    ///
    /// `Ok(None)` means the exchange completed but no `sso_session` cookie
    /// came back (typically wrong credentials); deciding what that means is
    /// left to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when either request fails at the transport
    /// level or the server answers with a status the handshake does not
    /// accept.
    #[instrument(skip(self, credentials), fields(sso_url = %self.sso_url, login = %credentials.login()))]
    pub async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<SessionCookie>, AuthError> {
        let token = self.fetch_token().await?;
        debug!(token_present = token.is_some(), "fetched login form");

        let jar = self.submit_credentials(credentials, token.as_deref()).await?;
        let session = jar
            .as_ref()
            .and_then(|jar| jar.get(SSO_SESSION_COOKIE))
            .map(SessionCookie::new);

        info!(session_present = session.is_some(), "SSO handshake complete");
        Ok(session)
    }

    async fn fetch_token(&self) -> Result<Option<String>, AuthError> {
        let step = HandshakeStep::FetchToken;
        let response = self
            .form_client
            .get(self.sso_url.as_str())
            .send()
            .await
            .map_err(|e| AuthError::transport(step, &self.sso_url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::rejected(step, &self.sso_url, status.as_u16()));
        }
        if response.url().as_str() != self.sso_url {
            debug!(form_url = %response.url(), "login form reached through redirect");
        }

        let jar = extract_cookies(response.headers());
        debug!(?jar, "login form cookies");
        Ok(jar.and_then(|jar| jar.get(SSO_TOKEN_COOKIE).map(str::to_string)))
    }

    async fn submit_credentials(
        &self,
        credentials: &Credentials,
        token: Option<&str>,
    ) -> Result<Option<CookieJar>, AuthError> {
        let step = HandshakeStep::SubmitCredentials;
        let response = self
            .submit_client
            .post(self.sso_url.as_str())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(login_form_body(credentials, token))
            .send()
            .await
            .map_err(|e| AuthError::transport(step, &self.sso_url, e))?;

        let status = response.status();
        if !is_accepted_login_status(status) {
            return Err(AuthError::rejected(step, &self.sso_url, status.as_u16()));
        }
        if status == StatusCode::SEE_OTHER {
            debug!("login answered with 303 redirect; not following");
        }

        let jar = extract_cookies(response.headers());
        debug!(?jar, "login response cookies");
        Ok(jar)
    }
}

/// A login POST succeeds on `303 See Other`; a 2xx answer passes through so
/// the missing session cookie can be reported. Other redirects are errors.
fn is_accepted_login_status(status: StatusCode) -> bool {
    status == StatusCode::SEE_OTHER || status.is_success()
}

/// Encodes the login form. `_csrf` is omitted when no token cookie was set.
fn login_form_body(credentials: &Credentials, token: Option<&str>) -> String {
    let mut form = form_urlencoded::Serializer::new(String::new());
    form.append_pair("login", credentials.login())
        .append_pair("password", credentials.password());
    if let Some(token) = token {
        form.append_pair("_csrf", token);
    }
    form.append_pair("return_to", "");
    form.finish()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_form_body_with_token() {
        let body = login_form_body(&Credentials::new("admin", "p@ss w0rd"), Some("tok=1"));
        assert_eq!(
            body,
            "login=admin&password=p%40ss+w0rd&_csrf=tok%3D1&return_to="
        );
    }

    #[test]
    fn test_login_form_body_without_token_omits_csrf() {
        let body = login_form_body(&Credentials::new("admin", "secret"), None);
        assert_eq!(body, "login=admin&password=secret&return_to=");
    }

    #[test]
    fn test_accepted_login_status() {
        assert!(is_accepted_login_status(StatusCode::SEE_OTHER));
        assert!(is_accepted_login_status(StatusCode::OK));
        assert!(!is_accepted_login_status(StatusCode::FOUND));
        assert!(!is_accepted_login_status(StatusCode::MOVED_PERMANENTLY));
        assert!(!is_accepted_login_status(StatusCode::TEMPORARY_REDIRECT));
        assert!(!is_accepted_login_status(StatusCode::UNAUTHORIZED));
        assert!(!is_accepted_login_status(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_session_cookie_header_value() {
        let cookie = SessionCookie::new("abc");
        assert_eq!(cookie.header_value(), "sso_session=abc");
        assert_eq!(cookie.value(), "abc");
        assert!(!cookie.is_empty());
    }

    #[test]
    fn test_secrets_redacted_in_debug() {
        let creds = format!("{:?}", Credentials::new("admin", "hunter2"));
        assert!(creds.contains("admin"));
        assert!(!creds.contains("hunter2"));

        let cookie = format!("{:?}", SessionCookie::new("session-secret"));
        assert!(!cookie.contains("session-secret"));
    }

    #[test]
    fn test_authenticator_keeps_sso_url() {
        let auth =
            Authenticator::new("https://sso.example.com/login", HttpTimeouts::default()).unwrap();
        assert_eq!(auth.sso_url(), "https://sso.example.com/login");
    }
}
