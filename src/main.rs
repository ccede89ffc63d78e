// src/main.rs

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use sitewatch_scanner::{logging, ScanReport, Scanner, ScannerConfig};
use std::path::PathBuf;
use tracing::info;

/// Scan one website and print its health report as JSON.
#[derive(Debug, Parser)]
#[command(name = "sitewatch-scanner", version, about)]
struct Cli {
    /// Target URL (http or https). A bare host name is scanned over https.
    url: String,

    /// Path to a TOML config file (defaults to the user config directory).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override every probe timeout, in seconds.
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Print single-line JSON instead of pretty output.
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let log_path = logging::initialize_logging()?;
    info!(log = %log_path.display(), "Logging initialized.");

    let mut config = match &cli.config {
        Some(path) => ScannerConfig::from_file(path)?,
        None => ScannerConfig::load()?,
    };
    if let Some(secs) = cli.timeout {
        config = config.with_uniform_timeout(secs);
    }

    let url = with_default_scheme(&cli.url);
    let report = Scanner::new(config)
        .scan(&url)
        .await
        .wrap_err_with(|| format!("Cannot scan '{}'", cli.url))?;

    print_report(&report, cli.compact)?;
    Ok(())
}

fn with_default_scheme(raw: &str) -> String {
    let raw = raw.trim();
    if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    }
}

fn print_report(report: &ScanReport, compact: bool) -> Result<()> {
    let json = if compact {
        serde_json::to_string(report)?
    } else {
        serde_json::to_string_pretty(report)?
    };
    println!("{}", json);
    eprintln!(
        "{} | {} | TLS {} | health {}/100{}",
        report.target.as_str(),
        report.site_status(),
        report.tls_status(),
        report.health_score,
        if report.has_issues() { " | issues found" } else { "" },
    );
    Ok(())
}
