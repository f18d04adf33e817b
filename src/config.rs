//! Run configuration: SSO endpoint, credentials, URL list location, limits.
//!
//! Values come from the process environment (the binary loads `.env` first)
//! with built-in defaults, and CLI flags override them. The URL list itself
//! is a YAML sequence of strings.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::auth::Credentials;
use crate::check::{DEFAULT_CONCURRENCY, MAX_CONCURRENCY, MIN_CONCURRENCY};
use crate::http::HttpTimeouts;

/// Environment variable holding the SSO login URL.
pub const SSO_URL_ENV: &str = "SSO_URL";
/// Environment variable holding the login name.
pub const LOGIN_ENV: &str = "LOGIN";
/// Environment variable holding the password.
pub const PASSWORD_ENV: &str = "PASSWORD";
/// Environment variable holding the URL list path.
pub const URLS_PATH_ENV: &str = "URL_CHECKER_URLS";

/// Default SSO login URL.
pub const DEFAULT_SSO_URL: &str = "https://localhost/login";
/// Default login name.
pub const DEFAULT_LOGIN: &str = "admin";
/// Default password.
pub const DEFAULT_PASSWORD: &str = "passw0rd";
/// Default URL list file.
pub const DEFAULT_URLS_PATH: &str = "urls.yml";

const MAX_TIMEOUT_SECS: u64 = 3600;

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The URL list file could not be read.
    #[error("failed to read URL list {path}: {source}")]
    Io {
        /// The URL list path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The URL list file is not a YAML sequence of strings.
    #[error("failed to parse URL list {path}: {source}")]
    Parse {
        /// The URL list path.
        path: PathBuf,
        /// The underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// A setting is outside its allowed range or malformed.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Setting name.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// SSO login URL, used for both handshake requests.
    pub sso_url: String,
    /// Login form credentials.
    pub credentials: Credentials,
    /// Path of the YAML URL list.
    pub urls_path: PathBuf,
    /// Maximum simultaneously in-flight checks.
    pub concurrency: usize,
    /// Timeouts for every HTTP request.
    pub timeouts: HttpTimeouts,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sso_url: DEFAULT_SSO_URL.to_string(),
            credentials: Credentials::new(DEFAULT_LOGIN, DEFAULT_PASSWORD),
            urls_path: PathBuf::from(DEFAULT_URLS_PATH),
            concurrency: DEFAULT_CONCURRENCY,
            timeouts: HttpTimeouts::default(),
        }
    }
}

impl Settings {
    /// Resolves settings from the process environment, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`, falling back to defaults for
    /// unset or empty values.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            sso_url: get(SSO_URL_ENV, DEFAULT_SSO_URL),
            credentials: Credentials::new(
                get(LOGIN_ENV, DEFAULT_LOGIN),
                get(PASSWORD_ENV, DEFAULT_PASSWORD),
            ),
            urls_path: PathBuf::from(get(URLS_PATH_ENV, DEFAULT_URLS_PATH)),
            ..Self::default()
        }
    }

    /// Validates values against runtime constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sso_url = Url::parse(&self.sso_url)
            .map_err(|e| ConfigError::invalid("sso_url", format!("{}: {e}", self.sso_url)))?;
        if !matches!(sso_url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "sso_url",
                format!("{}: expected an http or https URL", self.sso_url),
            ));
        }

        if self.credentials.login().is_empty() {
            return Err(ConfigError::invalid("login", "must not be empty"));
        }
        if self.credentials.password().is_empty() {
            return Err(ConfigError::invalid("password", "must not be empty"));
        }

        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(ConfigError::invalid(
                "concurrency",
                format!(
                    "{}. Expected range: {MIN_CONCURRENCY}..={MAX_CONCURRENCY}",
                    self.concurrency
                ),
            ));
        }

        validate_timeout_secs("connect_timeout_secs", self.timeouts.connect_secs)?;
        validate_timeout_secs("read_timeout_secs", self.timeouts.read_secs)?;
        Ok(())
    }
}

fn validate_timeout_secs(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if !(1..=MAX_TIMEOUT_SECS).contains(&value) {
        return Err(ConfigError::invalid(
            field,
            format!("{value}. Expected range: 1..={MAX_TIMEOUT_SECS}"),
        ));
    }
    Ok(())
}

/// Reads the YAML URL list at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read, or
/// [`ConfigError::Parse`] if it is not a sequence of strings.
#[instrument(level = "debug", skip(path), fields(path = %path.display()))]
pub fn load_url_list(path: &Path) -> Result<Vec<String>, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let urls = parse_url_list(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(count = urls.len(), "loaded URL list");
    Ok(urls)
}

/// Accepted URL list layouts: a bare sequence, or a mapping with a `urls` key.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UrlListFile {
    Plain(Vec<Option<String>>),
    Keyed { urls: Vec<Option<String>> },
}

/// Parses a YAML list of URL strings.
///
/// The document is either a sequence or a mapping with a `urls` sequence.
/// An empty document yields an empty list; null and blank entries are
/// skipped; surrounding whitespace is trimmed.
///
/// # Errors
///
/// Returns the YAML error if the document has neither layout.
pub fn parse_url_list(text: &str) -> Result<Vec<String>, serde_yaml::Error> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let entries = match serde_yaml::from_str::<UrlListFile>(text)? {
        UrlListFile::Plain(entries) | UrlListFile::Keyed { urls: entries } => entries,
    };
    Ok(entries
        .into_iter()
        .flatten()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_defaults() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings.sso_url, "https://localhost/login");
        assert_eq!(settings.credentials.login(), "admin");
        assert_eq!(settings.credentials.password(), "passw0rd");
        assert_eq!(settings.urls_path, PathBuf::from("urls.yml"));
        assert_eq!(settings.concurrency, 10);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_reads_values() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("SSO_URL", "https://sso.corp.example/login"),
            ("LOGIN", "alice"),
            ("PASSWORD", "s3cret"),
            ("URL_CHECKER_URLS", "/etc/urls.yml"),
        ]));
        assert_eq!(settings.sso_url, "https://sso.corp.example/login");
        assert_eq!(settings.credentials.login(), "alice");
        assert_eq!(settings.credentials.password(), "s3cret");
        assert_eq!(settings.urls_path, PathBuf::from("/etc/urls.yml"));
    }

    #[test]
    fn test_from_lookup_empty_value_falls_back_to_default() {
        let settings = Settings::from_lookup(lookup_from(&[("LOGIN", "")]));
        assert_eq!(settings.credentials.login(), "admin");
    }

    #[test]
    fn test_validate_rejects_bad_sso_url() {
        let settings = Settings {
            sso_url: "not a url".to_string(),
            ..Settings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "sso_url", .. }));

        let settings = Settings {
            sso_url: "ftp://sso.example.com/login".to_string(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_password() {
        let settings = Settings {
            credentials: Credentials::new("admin", ""),
            ..Settings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "password", .. }));
    }

    #[test]
    fn test_validate_rejects_concurrency_out_of_range() {
        for concurrency in [0, 101] {
            let settings = Settings {
                concurrency,
                ..Settings::default()
            };
            let err = settings.validate().unwrap_err();
            assert!(err.to_string().contains("concurrency"), "got: {err}");
        }
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let settings = Settings {
            timeouts: HttpTimeouts {
                connect_secs: 0,
                read_secs: 60,
            },
            ..Settings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("connect_timeout_secs"));
    }

    #[test]
    fn test_parse_url_list_sequence() {
        let urls = parse_url_list(
            "- https://a.example.com/\n- \"https://b.example.com/x?y=1\"\n-\n- '  '\n",
        )
        .unwrap();
        assert_eq!(
            urls,
            vec![
                "https://a.example.com/".to_string(),
                "https://b.example.com/x?y=1".to_string()
            ]
        );
    }

    #[test]
    fn test_parse_url_list_empty_document() {
        assert!(parse_url_list("").unwrap().is_empty());
        assert!(parse_url_list("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_url_list_keyed_mapping() {
        let urls = parse_url_list("urls:\n  - https://a.example.com/\n").unwrap();
        assert_eq!(urls, vec!["https://a.example.com/".to_string()]);
    }

    #[test]
    fn test_parse_url_list_rejects_other_shapes() {
        assert!(parse_url_list("urls: https://a.example.com/\n").is_err());
        assert!(parse_url_list("pages:\n  - https://a.example.com/\n").is_err());
        assert!(parse_url_list("just a string\n").is_err());
    }

    #[test]
    fn test_load_url_list_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "- https://a.example.com/").unwrap();
        writeln!(file, "- https://b.example.com/").unwrap();

        let urls = load_url_list(file.path()).unwrap();
        assert_eq!(urls.len(), 2);
    }

    #[test]
    fn test_load_url_list_missing_file() {
        let err = load_url_list(Path::new("/nonexistent/urls.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/urls.yml"));
    }

    #[test]
    fn test_load_url_list_parse_error_names_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "- [unclosed").unwrap();

        let err = load_url_list(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
