//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use url_checker_core::http::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use url_checker_core::{Credentials, DEFAULT_CONCURRENCY, Settings};

/// Log in through an SSO form and verify a list of URLs under that session.
///
/// Credentials come from the LOGIN and PASSWORD environment variables (a
/// `.env` file in the working directory is loaded first). Per-URL failures
/// are listed at the end but do not change the exit code.
#[derive(Parser, Debug)]
#[command(name = "url-checker")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// YAML file listing the URLs to check [env: URL_CHECKER_URLS, default: urls.yml]
    #[arg(short = 'u', long)]
    pub urls: Option<PathBuf>,

    /// SSO login form URL [env: SSO_URL, default: https://localhost/login]
    #[arg(long)]
    pub sso_url: Option<String>,

    /// Login name for the SSO form [env: LOGIN, default: admin]
    #[arg(long)]
    pub login: Option<String>,

    /// Maximum concurrent checks (1-100)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: u8,

    /// HTTP connect timeout in seconds (1-3600)
    #[arg(long, default_value_t = CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: u64,

    /// HTTP request timeout in seconds (1-3600)
    #[arg(long, default_value_t = READ_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: u64,
}

impl Args {
    /// Overrides environment-derived settings with values given on the command line.
    pub fn apply_to(&self, mut settings: Settings) -> Settings {
        if let Some(urls) = &self.urls {
            settings.urls_path.clone_from(urls);
        }
        if let Some(sso_url) = &self.sso_url {
            settings.sso_url.clone_from(sso_url);
        }
        if let Some(login) = &self.login {
            settings.credentials =
                Credentials::new(login.as_str(), settings.credentials.password());
        }
        settings.concurrency = usize::from(self.concurrency);
        settings.timeouts.connect_secs = self.connect_timeout;
        settings.timeouts.read_secs = self.timeout;
        settings
    }
}
