//! Error taxonomy.
//!
//! `SessionError` is fatal before any extraction has happened; once the
//! store is seeded, session failures degrade to stop signals and the run
//! keeps whatever it collected. Export failures are isolated per sink.
//! Malformed review blocks never surface here at all — the extractor logs
//! and skips them.

use thiserror::Error;

/// Failure of the browser session: launch, navigation, or protocol.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The browser could not be launched at all.
    #[error("failed to launch browser: {0}")]
    Launch(String),

    /// The target page could not be loaded within the bounded wait.
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// A CDP call failed mid-session.
    #[error("browser protocol error: {0}")]
    Protocol(#[from] chromiumoxide::error::CdpError),

    /// In-page JavaScript evaluation returned something unusable.
    #[error("script evaluation failed: {0}")]
    Script(String),
}

/// Failure writing one export sink. A CSV failure must not prevent the
/// XLSX from being written, and vice versa — callers handle each sink's
/// result independently.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("xlsx write failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
