//! `Set-Cookie` header parsing into a name→value jar.
//!
//! Only the `name=value` pair of each header value is kept; attributes such
//! as `Path`, `Expires` or `HttpOnly` are discarded. Values are opaque and are
//! never URL-decoded.

use std::collections::HashMap;
use std::fmt;

use reqwest::header::{HeaderMap, SET_COOKIE};
use tracing::{debug, instrument};

/// Cookie names and values taken from a single HTTP response.
///
/// Values are redacted in Debug output to prevent accidental logging of
/// session material.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: HashMap<String, String>,
}

impl CookieJar {
    /// Returns the value of the named cookie.
    ///
    /// Cookie values are sensitive; avoid logging the return value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Returns true if a cookie with this name was set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    /// Number of distinct cookie names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Returns true if the jar holds no cookies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Cookie names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cookies.keys().map(String::as_str)
    }

    fn insert(&mut self, name: String, value: String) {
        self.cookies.insert(name, value);
    }
}

// Custom Debug impl that redacts cookie values.
impl fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("CookieJar")
            .field("names", &names)
            .field("values", &"[REDACTED]")
            .finish()
    }
}

/// Builds a jar from the `Set-Cookie` headers of a response.
///
/// Returns `None` when the response carried no `Set-Cookie` header at all,
/// so callers can tell "no cookies were sent" apart from a parsed jar.
#[must_use]
#[instrument(level = "debug", skip(headers))]
pub fn extract_cookies(headers: &HeaderMap) -> Option<CookieJar> {
    if !headers.contains_key(SET_COOKIE) {
        return None;
    }

    let values: Vec<&str> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| match value.to_str() {
            Ok(text) => Some(text),
            Err(_) => {
                debug!("skipping non-UTF-8 Set-Cookie header value");
                None
            }
        })
        .collect();
    Some(fold_cookie_values(values))
}

/// Builds a jar from raw `Set-Cookie` header values.
///
/// Returns `None` for an empty input. For each value only the segment before
/// the first `;` is used, split on the first `=`; a segment without `=` is
/// stored under its full text with an empty value. Later duplicates win.
#[must_use]
pub fn parse_set_cookie<'a, I>(values: I) -> Option<CookieJar>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut values = values.into_iter().peekable();
    values.peek()?;
    Some(fold_cookie_values(values))
}

fn fold_cookie_values<'a>(values: impl IntoIterator<Item = &'a str>) -> CookieJar {
    values.into_iter().fold(CookieJar::default(), |mut jar, raw| {
        let pair = raw.split(';').next().unwrap_or_default().trim();
        if pair.is_empty() {
            return jar;
        }
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        debug!(name = %name.trim(), "parsed cookie");
        jar.insert(name.trim().to_string(), value.to_string());
        jar
    })
}
