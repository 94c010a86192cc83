//! Trustindex review scraper library.
//!
//! Drives a browser-rendered review aggregation page through repeated
//! "load more" expansions, extracts review records from each DOM snapshot,
//! deduplicates them across snapshots, and exports the result to CSV and
//! XLSX. The binary in `main.rs` is a thin clap wrapper around
//! [`driver::run`].

pub mod config;
pub mod driver;
pub mod error;
pub mod export;
pub mod extract;
pub mod record;
pub mod session;
pub mod store;
