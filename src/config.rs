//! Scrape configuration.
//!
//! All knobs are carried in an explicit [`ScrapeConfig`] value that the CLI
//! builds once and hands to the session and driver — nothing reads ambient
//! state, so the driver can be unit-tested with any configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default target page.
pub const DEFAULT_URL: &str = "https://www.trustindex.io/reviews/turkish-airline.com";

/// Default maximum number of "More" expansions.
pub const DEFAULT_MAX_LOOPS: usize = 10;

/// Default CSV export path.
pub const DEFAULT_CSV_PATH: &str = "turkish_airlines_reviews.csv";

/// Default XLSX export path.
pub const DEFAULT_EXCEL_PATH: &str = "turkish_airlines_reviews.xlsx";

/// Bounded wait for the initial page load.
const NAV_TIMEOUT: Duration = Duration::from_secs(25);

/// Bounded wait for new review blocks to appear after a click.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(15);

/// Configuration for one scrape run.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Review page URL.
    pub url: String,
    /// Safety cap on expansion iterations. Reaching it is an expected
    /// termination, not an error.
    pub max_loops: usize,
    /// CSV export target.
    pub csv_path: PathBuf,
    /// XLSX export target.
    pub excel_path: PathBuf,
    /// Run the browser headless. Disabled by `--show-browser`.
    pub headless: bool,
    /// Bounded wait for navigation and initial content readiness.
    pub nav_timeout: Duration,
    /// Bounded wait for the DOM to settle after an expansion click.
    pub settle_timeout: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            max_loops: DEFAULT_MAX_LOOPS,
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            excel_path: PathBuf::from(DEFAULT_EXCEL_PATH),
            headless: true,
            nav_timeout: NAV_TIMEOUT,
            settle_timeout: SETTLE_TIMEOUT,
        }
    }
}
