//! The review record — the only domain entity.

use serde::{Deserialize, Serialize};

/// Sentinel author when the source block has no name element.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Sentinel platform when the review block carries no `source-*` class.
/// Trustindex serves its own first-party reviews without a platform badge.
pub const DEFAULT_PLATFORM: &str = "Trustindex";

/// A single customer review, normalized from one `div.review` block.
///
/// Records are immutable once stored: the extractor builds them, the store
/// owns them, the export sinks read them. Every field is always populated,
/// with sentinels where the source gave us nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Source-assigned identifier (the block's `data-id` attribute).
    /// Empty when the source did not expose one; such records are kept
    /// but cannot be deduplicated against later snapshots.
    pub id: String,
    /// Reviewer display name, or [`UNKNOWN_AUTHOR`].
    pub author: String,
    /// `YYYY-MM-DD` when a known source format parsed; otherwise the raw
    /// source text verbatim. Never fabricated.
    pub date: String,
    /// Filled-star count in `1..=5`; `0` means the rating was unrecoverable.
    pub rating: u8,
    /// Review text, entity-decoded and whitespace-collapsed.
    pub body: String,
    /// Upstream platform the aggregator attributes the review to
    /// (e.g. "google"), or [`DEFAULT_PLATFORM`].
    pub source_platform: String,
}
