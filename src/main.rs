use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod catalog;
mod config;
mod crawler;
mod downloader;
mod error;
mod html;
mod models;
mod resources;
mod session;
mod storage;
mod utils;

use config::{Config, Credentials};
use crawler::{CrawlError, Crawler};
use error::CartFetchError;
use models::Site;

#[derive(Parser, Debug)]
#[command(name = "cartfetch")]
#[command(about = "Download purchased episodes and their files from a storefront subscriber area")]
#[command(version)]
struct Cli {
    /// Storefront subdomain, e.g. "acme" for https://acme.example-host.com
    subdomain: String,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory episodes are saved under (default: ./downloads)
    #[arg(short, long)]
    output: Option<String>,

    /// Use this base URL instead of the one derived from the subdomain
    #[arg(long)]
    base_url: Option<String>,

    /// Subscriber login name
    #[arg(long, env = "PDP_USER", default_value = "", hide_default_value = true)]
    username: String,

    /// Subscriber password
    #[arg(long, env = "PDP_PASS", default_value = "", hide_default_value = true, hide_env_values = true)]
    password: String,

    /// Keep downloading other episodes after one fails
    #[arg(long)]
    keep_going: bool,

    /// List episodes and files without downloading
    #[arg(long)]
    dry_run: bool,

    /// Hide download progress bars
    #[arg(long)]
    no_progress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("{:#}", e);
        return ExitCode::from(1);
    }

    let (config, site) = match prepare(&cli) {
        Ok(prepared) => prepared,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(1);
        }
    };

    let credentials = Credentials::new(cli.username, cli.password);
    if credentials.username.is_empty() || credentials.password.is_empty() {
        warn!("PDP_USER or PDP_PASS is not set; signing in with empty credentials");
    }

    match Crawler::new(config).dry_run(cli.dry_run).run(site, &credentials).await {
        Ok(summary) => {
            info!("Finished: {}", summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            report(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cartfetch={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    Ok(())
}

/// Merge the config file with command-line overrides and work out which site to use.
fn prepare(cli: &Cli) -> Result<(Config, Site)> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(output) = &cli.output {
        config.storage.base_path = output.clone();
    }
    if let Some(base_url) = &cli.base_url {
        config.site.base_url = Some(base_url.clone());
    }
    if cli.keep_going {
        config.download.keep_going = true;
    }
    if cli.no_progress {
        config.download.progress = false;
    }

    let site = match &config.site.base_url {
        Some(base_url) => Site::with_base_url(&cli.subdomain, base_url),
        None => Site::new(&cli.subdomain, &config.site.domain),
    }
    .with_context(|| format!("cannot build a site address for '{}'", cli.subdomain))?;

    Ok((config, site))
}

fn report(err: &CrawlError) {
    error!("{}", err);
    match err {
        CrawlError::Login(CartFetchError::AuthRejected(_)) => {
            error!("Invalid username and password combination. Make sure PDP_USER and PDP_PASS are set.");
        }
        CrawlError::Incomplete { summary, failures } => {
            for failure in failures {
                error!("  {}: {}", failure.episode, failure.error);
            }
            info!("Completed before failures: {}", summary);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["cartfetch"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn subdomain_is_required() {
        let err = Cli::try_parse_from(["cartfetch"]).unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn defaults_build_site_from_subdomain() {
        let cli = parse(&["acme", "--username", "alice", "--password", "pw"]);
        let (config, site) = prepare(&cli).unwrap();

        assert_eq!(site.base().as_str(), "https://acme.example-host.com/");
        assert_eq!(config.storage.base_path, "./downloads");
        assert!(!config.download.keep_going);
        assert_eq!(cli.username, "alice");
    }

    #[test]
    fn flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[site]\ndomain = \"staging-host.net\"\n\n[storage]\nbase_path = \"/srv/episodes\""
        )
        .unwrap();
        let path = file.path().to_string_lossy().to_string();

        let cli = parse(&["acme", "-c", path.as_str(), "--keep-going", "--no-progress"]);
        let (config, site) = prepare(&cli).unwrap();
        assert_eq!(site.base().as_str(), "https://acme.staging-host.net/");
        assert_eq!(config.storage.base_path, "/srv/episodes");
        assert!(config.download.keep_going);
        assert!(!config.download.progress);

        let cli = parse(&["acme", "-c", path.as_str(), "-o", "out", "--base-url", "http://localhost:8080"]);
        let (config, site) = prepare(&cli).unwrap();
        assert_eq!(site.base().as_str(), "http://localhost:8080/");
        assert_eq!(config.storage.base_path, "out");
    }

    #[test]
    fn bad_subdomain_is_rejected() {
        let cli = parse(&["acme.evil.com"]);
        assert!(prepare(&cli).is_err());
    }
}
