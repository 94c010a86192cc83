//! End-to-end pipeline tests against a scripted session.
//!
//! These exercise the full driver → extractor → store → export path with
//! realistic Trustindex markup, no browser required.

use std::path::Path;

use async_trait::async_trait;

use tiscrape::config::ScrapeConfig;
use tiscrape::driver;
use tiscrape::error::SessionError;
use tiscrape::export;
use tiscrape::session::{ExpandResult, Session};

/// Serves a fixed snapshot sequence; each expansion advances one snapshot,
/// then the terminal result fires.
struct PageSequence {
    snapshots: Vec<String>,
    cursor: usize,
    terminal: ExpandResult,
}

#[async_trait]
impl Session for PageSequence {
    async fn snapshot(&mut self) -> Result<String, SessionError> {
        Ok(self.snapshots[self.cursor].clone())
    }

    async fn expand(&mut self) -> Result<ExpandResult, SessionError> {
        if self.cursor + 1 < self.snapshots.len() {
            self.cursor += 1;
            Ok(ExpandResult::Expanded)
        } else {
            Ok(self.terminal)
        }
    }

    async fn close(self: Box<Self>) -> Result<(), SessionError> {
        Ok(())
    }
}

fn review_block(id: &str, author: &str, date: &str, filled: usize, body: &str) -> String {
    let stars: String = (0..5)
        .map(|i| {
            if i < filled {
                r#"<span class="ti-star f"></span>"#
            } else {
                r#"<span class="ti-star e"></span>"#
            }
        })
        .collect();
    format!(
        r#"<div class="review source-google" data-id="{id}">
             <div class="ti-name">{author}</div>
             <div class="ti-date">{date}</div>
             <div class="ti-stars">{stars}</div>
             <div class="ti-review-content">{body}</div>
           </div>"#
    )
}

fn wrap(blocks: &str) -> String {
    format!("<html><body><div class=\"ti-widget\">{blocks}</div></body></html>")
}

fn cfg(max_loops: usize) -> ScrapeConfig {
    ScrapeConfig {
        max_loops,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_two_snapshot_reservice_yields_len_plus_one() {
    let first: String = (0..4)
        .map(|i| review_block(&format!("r{i}"), "Author", "2024.01.02", 4, "Good seats"))
        .collect();
    let second = format!(
        "{first}{}",
        review_block("r-new", "Late Arrival", "2024.02.02", 2, "Lost my bag")
    );

    let session = PageSequence {
        snapshots: vec![wrap(&first), wrap(&second)],
        cursor: 0,
        terminal: ExpandResult::NoMoreContent,
    };
    let outcome = driver::run(Box::new(session), &cfg(10)).await.unwrap();

    // Snapshot 2 re-served all of snapshot 1 plus one new record.
    assert_eq!(outcome.store.len(), 5);
    let last = outcome.store.records().last().unwrap();
    assert_eq!(last.id, "r-new");
    assert_eq!(last.author, "Late Arrival");
    assert_eq!(last.date, "2024-02-02");
    assert_eq!(last.rating, 2);
}

#[tokio::test]
async fn test_full_run_normalizes_and_exports() {
    let blocks = format!(
        "{}{}{}",
        review_block(
            "a1",
            "Ayşe",
            "2024.03.05",
            5,
            "Great crew,<br>smooth landing &amp;amp; early arrival"
        ),
        // No star markup, unparseable date, no platform badge.
        r#"<div class="review" data-id="a2">
             <div class="ti-name">J. Doe</div>
             <div class="ti-date">a while ago</div>
             <div class="ti-review-content">Meh</div>
           </div>"#,
        // Structurally broken block: must be skipped, not fatal.
        r#"<div class="review"><img src="x.png"></div>"#,
    );

    let session = PageSequence {
        snapshots: vec![wrap(&blocks)],
        cursor: 0,
        terminal: ExpandResult::NoMoreContent,
    };
    let outcome = driver::run(Box::new(session), &cfg(10)).await.unwrap();
    let records = outcome.store.into_records();
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].date, "2024-03-05");
    assert_eq!(records[0].rating, 5);
    assert_eq!(
        records[0].body,
        "Great crew, smooth landing & early arrival"
    );
    assert_eq!(records[0].source_platform, "google");

    assert_eq!(records[1].date, "a while ago");
    assert_eq!(records[1].rating, 0);
    assert_eq!(records[1].source_platform, "Trustindex");

    // Both sinks consume the same ordered set; one failing must not
    // block the other.
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("reviews.csv");
    assert!(export::write_csv(&records, &csv_path).is_ok());
    assert!(export::write_xlsx(&records, Path::new("/nonexistent/reviews.xlsx")).is_err());

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("author,date,rating,body,source_platform"));
    assert!(csv.contains("Ayşe"));
}

#[tokio::test]
async fn test_zero_review_page_is_success_with_empty_export() {
    let session = PageSequence {
        snapshots: vec![wrap("<p>This business has no reviews yet.</p>")],
        cursor: 0,
        terminal: ExpandResult::NoMoreContent,
    };
    let outcome = driver::run(Box::new(session), &cfg(10)).await.unwrap();
    assert!(outcome.store.is_empty());

    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("empty.csv");
    export::write_csv(outcome.store.records(), &csv_path).unwrap();
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.trim(), "author,date,rating,body,source_platform");
}
