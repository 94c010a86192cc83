use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};

use tiscrape::config::{self, ScrapeConfig};
use tiscrape::driver;
use tiscrape::export;
use tiscrape::session::chromium::ChromiumSession;

#[derive(Parser)]
#[command(
    name = "tiscrape",
    about = "Scrape reviews from a Trustindex aggregation page into CSV and XLSX",
    version
)]
struct Cli {
    /// Trustindex review page to scrape
    #[arg(long, short = 'u', default_value = config::DEFAULT_URL)]
    url: String,

    /// Maximum number of "More" expansions
    #[arg(long, short = 'l', default_value_t = config::DEFAULT_MAX_LOOPS)]
    loops: usize,

    /// Output CSV path
    #[arg(long, short = 'c', default_value = config::DEFAULT_CSV_PATH)]
    csv: PathBuf,

    /// Output XLSX path
    #[arg(long, short = 'x', default_value = config::DEFAULT_EXCEL_PATH)]
    excel: PathBuf,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Run with a visible browser window instead of headless
    #[arg(long)]
    show_browser: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "tiscrape=debug"
    } else {
        "tiscrape=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.parse().unwrap()),
        )
        .init();

    let cfg = ScrapeConfig {
        url: cli.url,
        max_loops: cli.loops,
        csv_path: cli.csv,
        excel_path: cli.excel,
        headless: !cli.show_browser,
        ..Default::default()
    };

    match scrape(&cfg).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn scrape(cfg: &ScrapeConfig) -> anyhow::Result<()> {
    let session = ChromiumSession::open(cfg)
        .await
        .context("failed to open review page")?;

    let outcome = driver::run(Box::new(session), cfg)
        .await
        .context("extraction failed before any reviews were collected")?;

    let records = outcome.store.into_records();
    if records.is_empty() {
        warn!("no reviews were extracted");
    } else {
        info!(
            count = records.len(),
            expansions = outcome.expansions,
            "extraction complete"
        );
    }

    // The sinks fail independently: a broken spreadsheet target must not
    // cost us the CSV, and vice versa.
    let mut failed_sinks = 0;
    if let Err(e) = export::write_csv(&records, &cfg.csv_path) {
        error!("CSV export failed: {e}");
        failed_sinks += 1;
    }
    if let Err(e) = export::write_xlsx(&records, &cfg.excel_path) {
        error!("XLSX export failed: {e}");
        failed_sinks += 1;
    }
    if failed_sinks == 2 && !records.is_empty() {
        anyhow::bail!("both export sinks failed");
    }

    Ok(())
}
