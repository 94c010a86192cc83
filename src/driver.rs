//! The expansion driver — a small explicit state machine.
//!
//! `Init` seeds the store from the first snapshot. `Expanding` repeatedly
//! triggers the session's expansion interaction, bounded by the configured
//! loop cap, re-extracting and merging after each successful expansion.
//! `Exhausted` is reached on any stop signal; `Done` terminates. The four
//! named states keep termination reasoning explicit and testable against a
//! scripted fake session.
//!
//! Stop signals, in order of authority: no new unique id admitted after an
//! expansion (the only criterion tied directly to the data model), then
//! `NoMoreContent` / `Timeout` from the session. Reaching the loop bound is
//! an expected termination, not an error. Once the store is seeded, session
//! failures degrade to stop signals so the run keeps what it has collected.

use tracing::{debug, info, warn};

use crate::config::ScrapeConfig;
use crate::error::SessionError;
use crate::extract::extract_reviews;
use crate::session::{ExpandResult, Session};
use crate::store::ReviewStore;

/// Driver state. See module docs for the transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Init,
    Expanding,
    Exhausted,
    Done,
}

/// Result of a completed run.
#[derive(Debug)]
pub struct ScrapeOutcome {
    /// The deduplicated, order-preserving record set.
    pub store: ReviewStore,
    /// Number of successful expansions performed.
    pub expansions: usize,
}

/// Drive the session until a stop signal or the loop bound, then close it.
///
/// The session is closed on every exit path, including the fatal one.
/// Fails only if the initial snapshot cannot be taken — after the store is
/// seeded, all failures degrade to stop signals.
pub async fn run(
    mut session: Box<dyn Session>,
    cfg: &ScrapeConfig,
) -> Result<ScrapeOutcome, SessionError> {
    let mut store = ReviewStore::new();
    let mut expansions = 0;

    let result = run_loop(session.as_mut(), cfg, &mut store, &mut expansions).await;
    if let Err(e) = session.close().await {
        warn!("session close failed: {e}");
    }
    result?;

    Ok(ScrapeOutcome { store, expansions })
}

async fn run_loop(
    session: &mut dyn Session,
    cfg: &ScrapeConfig,
    store: &mut ReviewStore,
    expansions: &mut usize,
) -> Result<(), SessionError> {
    let mut state = DriverState::Init;
    loop {
        state = match state {
            DriverState::Init => {
                let html = session.snapshot().await?;
                let candidates = extract_reviews(&html);
                let admitted = store.merge(candidates);
                info!(admitted, "seeded store from initial snapshot");
                DriverState::Expanding
            }

            DriverState::Expanding if *expansions >= cfg.max_loops => {
                info!(bound = cfg.max_loops, "expansion budget exhausted");
                DriverState::Done
            }

            DriverState::Expanding => match session.expand().await {
                Ok(ExpandResult::Expanded) => {
                    *expansions += 1;
                    match session.snapshot().await {
                        Ok(html) => {
                            let admitted = store.merge(extract_reviews(&html));
                            if admitted == 0 {
                                info!("expansion admitted no new unique reviews, stopping");
                                DriverState::Exhausted
                            } else {
                                debug!(admitted, total = store.len(), "merged snapshot");
                                DriverState::Expanding
                            }
                        }
                        Err(e) => {
                            warn!("snapshot failed after expansion: {e}");
                            DriverState::Exhausted
                        }
                    }
                }
                Ok(ExpandResult::NoMoreContent) => {
                    info!("no more content to expand");
                    DriverState::Exhausted
                }
                Ok(ExpandResult::Timeout) => {
                    info!("expansion produced no new content within the bounded wait");
                    DriverState::Exhausted
                }
                Err(e) => {
                    warn!(total = store.len(), "expand failed, keeping collected records: {e}");
                    DriverState::Exhausted
                }
            },

            DriverState::Exhausted => DriverState::Done,

            DriverState::Done => return Ok(()),
        };
    }
}
