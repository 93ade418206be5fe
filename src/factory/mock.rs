//! Mock browser factory for testing.
//!
//! [`MockBrowserFactory`] counts launch attempts and fails on demand, so the
//! lifecycle managers' error paths can be tested without Chrome installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use html2pdf_render::factory::mock::MockBrowserFactory;
//!
//! let factory = MockBrowserFactory::always_fails("Chrome not installed");
//! assert!(factory.create().is_err());
//! assert_eq!(factory.creation_count(), 1);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use headless_chrome::Browser;

use super::BrowserFactory;
use crate::error::{ConvertError, Result};
use crate::factory::ChromeBrowserFactory;

/// Factory that counts launches and can be told to fail.
///
/// Successful launches go through [`ChromeBrowserFactory::with_defaults`],
/// so they still need a real Chrome.
pub struct MockBrowserFactory {
    should_fail: bool,
    error_message: String,
    creation_count: Arc<AtomicUsize>,
}

impl MockBrowserFactory {
    /// Factory that launches real browsers.
    pub fn new() -> Self {
        Self {
            should_fail: false,
            error_message: String::new(),
            creation_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Factory whose every launch fails with `message`.
    pub fn always_fails<S: Into<String>>(message: S) -> Self {
        Self {
            should_fail: true,
            error_message: message.into(),
            ..Self::new()
        }
    }

    /// Launch attempts so far.
    pub fn creation_count(&self) -> usize {
        self.creation_count.load(Ordering::SeqCst)
    }

    /// Shared handle to the attempt counter.
    ///
    /// Still readable after the factory has been moved into a manager.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.creation_count)
    }
}

impl Default for MockBrowserFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserFactory for MockBrowserFactory {
    fn create(&self) -> Result<Browser> {
        let attempt = self.creation_count.fetch_add(1, Ordering::SeqCst);

        if self.should_fail {
            log::debug!("MockBrowserFactory failing attempt {}", attempt + 1);
            return Err(ConvertError::EngineUnavailable(self.error_message.clone()));
        }

        ChromeBrowserFactory::with_defaults().create()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
