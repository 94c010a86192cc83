//! CSS-selector based review extraction from a DOM snapshot.
//!
//! One snapshot in, document-ordered candidate records out. Each
//! `div.review` block is mapped to a [`Review`] with per-field
//! normalization: dates are reformatted to `YYYY-MM-DD` when a known
//! source format parses, ratings are counted from filled star spans,
//! body text is entity-decoded and whitespace-collapsed. A missing
//! sub-field gets its sentinel default — a partially-labeled review is
//! still a review. Only a block exposing none of its expected sub-fields
//! is skipped, and that never aborts the rest of the snapshot.

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::record::{Review, DEFAULT_PLATFORM, UNKNOWN_AUTHOR};

/// Source date formats, tried in order. First hit wins.
/// `%Y.%m.%d` is the aggregator's native form; the rest cover platform
/// badges that pass their own date text through.
const DATE_FORMATS: &[&str] = &["%Y.%m.%d", "%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%d.%m.%Y"];

struct BlockSelectors {
    review: Selector,
    name: Selector,
    date: Selector,
    stars: Selector,
    filled_star: Selector,
    content: Selector,
}

impl BlockSelectors {
    fn new() -> Self {
        // Static selectors; parse failures would be programmer error.
        Self {
            review: Selector::parse("div.review").unwrap(),
            name: Selector::parse("div.ti-name").unwrap(),
            date: Selector::parse("div.ti-date").unwrap(),
            stars: Selector::parse("div.ti-stars").unwrap(),
            filled_star: Selector::parse("span.ti-star.f").unwrap(),
            content: Selector::parse("div.ti-review-content").unwrap(),
        }
    }
}

/// Extract candidate records from one markup snapshot, in document order.
///
/// An empty or unexpected snapshot yields an empty vec, not an error.
pub fn extract_reviews(html: &str) -> Vec<Review> {
    let document = Html::parse_document(html);
    let sel = BlockSelectors::new();

    let mut candidates = Vec::new();
    for block in document.select(&sel.review) {
        match parse_block(&block, &sel) {
            Some(review) => candidates.push(review),
            None => debug!("skipping review block with no recoverable fields"),
        }
    }
    candidates
}

/// Map one `div.review` block to a record, or `None` if the block is
/// structurally broken (none of id, author, date, or body recoverable).
fn parse_block(block: &ElementRef<'_>, sel: &BlockSelectors) -> Option<Review> {
    let id = block
        .value()
        .attr("data-id")
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    let author = first_text(block, &sel.name);
    let date_raw = first_text(block, &sel.date);
    let body_raw = block.select(&sel.content).next().map(text_with_breaks);

    if id.is_empty() && author.is_none() && date_raw.is_none() && body_raw.is_none() {
        return None;
    }

    let rating = block
        .select(&sel.stars)
        .next()
        .map(|stars| stars.select(&sel.filled_star).count().min(5) as u8)
        .unwrap_or(0);

    let source_platform = block
        .value()
        .classes()
        .find_map(|class| class.strip_prefix("source-"))
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_PLATFORM.to_string());

    Some(Review {
        id,
        author: author.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        date: date_raw.map(|d| normalize_date(&d)).unwrap_or_default(),
        rating,
        body: body_raw
            .map(|b| collapse_ws(&decode_entities(&b)))
            .unwrap_or_default(),
        source_platform,
    })
}

/// Cleaned text of the first element matching `sel`, or `None` if the
/// element is absent or contains only whitespace.
fn first_text(block: &ElementRef<'_>, sel: &Selector) -> Option<String> {
    let el = block.select(sel).next()?;
    let text = collapse_ws(&decode_entities(&el.text().collect::<String>()));
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Concatenated text of an element with `<br>` treated as a separator,
/// so adjacent lines don't fuse into one word.
fn text_with_breaks(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in el.descendants() {
        if let Some(text) = node.value().as_text() {
            out.push_str(&text.text);
        } else if let Some(element) = node.value().as_element() {
            if element.name() == "br" {
                out.push(' ');
            }
        }
    }
    out
}

/// Reformat a recognized source date to `YYYY-MM-DD`; keep the raw text
/// verbatim when no format matches. Never fails.
pub fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.format("%Y-%m-%d").to_string();
        }
    }
    trimmed.to_string()
}

/// Decode HTML entities: the common named set plus numeric references.
///
/// The DOM parser already decoded one layer; this handles the
/// double-encoded text the aggregator serves (`&amp;quot;` etc.).
/// Unknown or malformed entities pass through untouched.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let semi = tail[1..].find(';').map(|i| i + 1);
        if let Some(semi) = semi {
            // Longest legitimate reference is a hex codepoint, 9 chars.
            if (2..=9).contains(&semi) {
                if let Some(ch) = decode_entity(&tail[1..semi]) {
                    out.push(ch);
                    rest = &tail[semi + 1..];
                    continue;
                }
            }
        }
        out.push('&');
        rest = &tail[1..];
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code)
        }
    }
}

/// Collapse whitespace runs (including NBSP and the newlines `<br>`
/// turned into) to single spaces and trim.
pub fn collapse_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}
