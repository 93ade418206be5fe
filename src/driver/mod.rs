//! Page driver abstraction.
//!
//! [`PageDriver`] is the narrow set of page operations the conversion
//! pipeline needs from a browser engine. Everything above this seam
//! (loading, measuring, sizing, exporting) is engine-agnostic and is tested
//! against [`mock::MockPage`].
//!
//! # Available Drivers
//!
//! | Driver | Description |
//! |--------|-------------|
//! | [`ChromePage`] | A headless Chrome tab |
//! | [`mock::MockPage`] | Scripted page for tests (feature-gated) |

mod chrome;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use chrome::ChromePage;

use std::time::Duration;

use crate::loader::MediaType;
use crate::sizing::PdfExportOptions;

/// Failure reported by a page driver.
///
/// Drivers only distinguish "took too long" from "failed". Callers map
/// these onto [`ConvertError`](crate::ConvertError) according to the step
/// that was running.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DriverError {
    /// The engine reported an error.
    #[error("{0}")]
    Failed(String),

    /// The engine did not answer in time.
    #[error("timed out: {0}")]
    Timeout(String),
}

/// Result type for driver calls.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Operations on a single browser page.
///
/// One driver instance is one page. It is owned by a
/// [`PageSession`](crate::PageSession), which calls [`close`](Self::close)
/// when dropped.
///
/// # Thread Safety
///
/// Drivers are `Send` so a session can be created on one thread and used
/// on a blocking worker.
pub trait PageDriver: Send {
    /// Resize this page's viewport, in CSS pixels.
    ///
    /// Affects this page only, never other pages of the same browser.
    fn set_viewport(&self, width: u32, height: u32) -> DriverResult<()>;

    /// Switch the CSS media type used for rendering.
    fn emulate_media(&self, media: MediaType) -> DriverResult<()>;

    /// Navigate and wait for the navigation to commit.
    ///
    /// Returns [`DriverError::Timeout`] if the engine does not finish
    /// within `timeout`, and [`DriverError::Failed`] for load failures.
    fn navigate(&self, url: &str, timeout: Duration) -> DriverResult<()>;

    /// Replace the main frame's document with `html`.
    ///
    /// Subresources the new document references start loading afterwards;
    /// callers wait for them separately.
    fn set_document_content(&self, html: &str) -> DriverResult<()>;

    /// Evaluate a JavaScript expression and return its JSON value.
    ///
    /// `Ok(None)` means the expression produced `undefined` or a value that
    /// has no JSON form.
    fn evaluate(&self, expression: &str) -> DriverResult<Option<serde_json::Value>>;

    /// Print the current page to PDF.
    fn print_to_pdf(&self, options: &PdfExportOptions) -> DriverResult<Vec<u8>>;

    /// Close the page.
    fn close(&self) -> DriverResult<()>;
}
