//! CLI entry point for the SSO URL checker.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use url_checker_core::{ConsoleReporter, Settings, run};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Load .env before the filter is built so RUST_LOG may come from it
    let dotenv = dotenvy::dotenv();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Logs go to stderr; stdout carries the report.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => debug!("no .env file found"),
        Err(e) => return Err(e).context("failed to load .env"),
    }

    debug!(?args, "CLI arguments parsed");
    let settings = args.apply_to(Settings::from_env());
    info!(sso_url = %settings.sso_url, urls = %settings.urls_path.display(), "URL checker starting");

    let reporter = ConsoleReporter::stdio(args.quiet);
    let outcome = run(&settings, &reporter).await;

    Ok(outcome.exit_status().into())
}
