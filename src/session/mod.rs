//! Browser session abstraction.
//!
//! Defines the [`Session`] trait that owns one rendered-page session and
//! hides the browser engine behind three operations: serialize the current
//! DOM, trigger one "load more" expansion, and release the browser. Any
//! engine binding satisfying this contract is substitutable — the driver
//! is tested against scripted fakes, and production uses
//! [`chromium::ChromiumSession`].

pub mod chromium;

use async_trait::async_trait;

use crate::error::SessionError;

/// Outcome of one expansion interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandResult {
    /// The control was triggered and new content settled in.
    Expanded,
    /// The control is absent or disappeared — the source has nothing more.
    NoMoreContent,
    /// The control was triggered but no new content settled within the
    /// bounded wait. Treated as a stop signal, never retried.
    Timeout,
}

/// One rendered-page session against one URL.
#[async_trait]
pub trait Session: Send {
    /// Serialize the current rendered DOM.
    async fn snapshot(&mut self) -> Result<String, SessionError>;

    /// Locate and trigger the "load more" control, waiting (bounded) for
    /// new content to settle.
    async fn expand(&mut self) -> Result<ExpandResult, SessionError>;

    /// Release browser resources. Must be invoked on every exit path.
    async fn close(self: Box<Self>) -> Result<(), SessionError>;
}
