//! Scripted page driver and session manager for testing.
//!
//! This module provides [`MockPage`] and [`MockSessionManager`], which
//! stand in for Chrome so the conversion pipeline can be exercised without
//! a browser.
//!
//! # Availability
//!
//! Only available when:
//! - Running tests (`#[cfg(test)]`)
//! - The `test-utils` feature is enabled
//!
//! # Behavior
//!
//! A page answers the loader's and probe's JavaScript probes from a
//! [`MockScript`], can be told to fail any step, and records every
//! state-changing call as a [`PageCall`]. The manager counts pages through
//! the same [`SessionCounters`] real managers use, so leak checks in tests
//! see exactly what production would.
//!
//! # Example
//!
//! ```rust,ignore
//! use html2pdf_render::driver::mock::{MockScript, MockSessionManager};
//!
//! let manager = MockSessionManager::new(MockScript {
//!     body_height: Some(1200.0),
//!     ..MockScript::default()
//! });
//!
//! // ... run a conversion against `manager` ...
//!
//! assert_eq!(manager.stats().open_pages(), 0);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;

use super::{DriverError, DriverResult, PageDriver};
use crate::error::{ConvertError, Result};
use crate::lifecycle::BrowserSessionManager;
use crate::loader::{FONTS_STATUS_JS, MediaType, READY_STATE_JS, RESOURCE_COUNT_JS};
use crate::probe::BODY_HEIGHT_JS;
use crate::session::PageSession;
use crate::sizing::PdfExportOptions;
use crate::stats::{SessionCounters, SessionStats};

/// Bytes returned by a successful mock print.
pub const MOCK_PDF_BYTES: &[u8] = b"%PDF-1.7\n% mock document\n%%EOF\n";

/// How a mock page answers.
#[derive(Debug, Clone)]
pub struct MockScript {
    /// Value of `document.readyState`.
    pub ready_state: String,
    /// Number of resource timing entries.
    pub resource_count: u64,
    /// Value of `document.fonts.status`.
    pub fonts_status: String,
    /// Body bounding box height; `None` simulates a missing body.
    pub body_height: Option<f64>,
    /// Bytes returned by `print_to_pdf`.
    pub pdf_bytes: Vec<u8>,
    /// Error for every navigation.
    pub navigate_error: Option<DriverError>,
    /// Error for document content injection.
    pub content_error: Option<DriverError>,
    /// Error for every evaluation.
    pub evaluate_error: Option<DriverError>,
    /// Error for viewport changes.
    pub viewport_error: Option<DriverError>,
    /// Error for media emulation.
    pub media_error: Option<DriverError>,
    /// Error for printing.
    pub print_error: Option<DriverError>,
    /// Error for closing.
    pub close_error: Option<DriverError>,
}

impl Default for MockScript {
    fn default() -> Self {
        Self {
            ready_state: "complete".to_string(),
            resource_count: 0,
            fonts_status: "loaded".to_string(),
            body_height: Some(1000.0),
            pdf_bytes: MOCK_PDF_BYTES.to_vec(),
            navigate_error: None,
            content_error: None,
            evaluate_error: None,
            viewport_error: None,
            media_error: None,
            print_error: None,
            close_error: None,
        }
    }
}

/// A state-changing call made on a mock page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageCall {
    /// `set_viewport(width, height)`
    SetViewport {
        /// Width in px.
        width: u32,
        /// Height in px.
        height: u32,
    },
    /// `emulate_media(media)`
    EmulateMedia(MediaType),
    /// `navigate(url)`
    Navigate(String),
    /// `set_document_content(html)`
    SetDocumentContent(String),
    /// `print_to_pdf(options)`
    PrintToPdf(PdfExportOptions),
    /// `close()`
    Close,
}

/// Shared, ordered log of calls made on one page.
pub type CallLog = Arc<Mutex<Vec<PageCall>>>;

/// A scripted page.
#[derive(Debug)]
pub struct MockPage {
    script: MockScript,
    calls: CallLog,
}

impl MockPage {
    /// Page answering from `script`.
    pub fn new(script: MockScript) -> Self {
        Self {
            script,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle to this page's call log, usable after the page is dropped.
    pub fn call_log(&self) -> CallLog {
        Arc::clone(&self.calls)
    }

    /// Calls recorded so far.
    pub fn calls(&self) -> Vec<PageCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: PageCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn fail_or<T>(error: &Option<DriverError>, value: T) -> DriverResult<T> {
        match error {
            Some(e) => Err(e.clone()),
            None => Ok(value),
        }
    }
}

impl PageDriver for MockPage {
    fn set_viewport(&self, width: u32, height: u32) -> DriverResult<()> {
        self.record(PageCall::SetViewport { width, height });
        Self::fail_or(&self.script.viewport_error, ())
    }

    fn emulate_media(&self, media: MediaType) -> DriverResult<()> {
        self.record(PageCall::EmulateMedia(media));
        Self::fail_or(&self.script.media_error, ())
    }

    fn navigate(&self, url: &str, _timeout: Duration) -> DriverResult<()> {
        self.record(PageCall::Navigate(url.to_string()));
        Self::fail_or(&self.script.navigate_error, ())
    }

    fn set_document_content(&self, html: &str) -> DriverResult<()> {
        self.record(PageCall::SetDocumentContent(html.to_string()));
        Self::fail_or(&self.script.content_error, ())
    }

    fn evaluate(&self, expression: &str) -> DriverResult<Option<Value>> {
        if let Some(e) = &self.script.evaluate_error {
            return Err(e.clone());
        }

        let value = match expression {
            READY_STATE_JS => Some(Value::from(self.script.ready_state.clone())),
            RESOURCE_COUNT_JS => Some(Value::from(self.script.resource_count)),
            FONTS_STATUS_JS => Some(Value::from(self.script.fonts_status.clone())),
            BODY_HEIGHT_JS => match self.script.body_height {
                Some(height) => Some(Value::from(height)),
                None => Some(Value::Null),
            },
            _ => None,
        };
        Ok(value)
    }

    fn print_to_pdf(&self, options: &PdfExportOptions) -> DriverResult<Vec<u8>> {
        self.record(PageCall::PrintToPdf(*options));
        Self::fail_or(&self.script.print_error, self.script.pdf_bytes.clone())
    }

    fn close(&self) -> DriverResult<()> {
        self.record(PageCall::Close);
        Self::fail_or(&self.script.close_error, ())
    }
}

/// Session manager handing out [`MockPage`]s.
///
/// Keeps the call log of every page it creates, in acquisition order.
#[derive(Debug)]
pub struct MockSessionManager {
    script: MockScript,
    counters: Arc<SessionCounters>,
    pages: Mutex<Vec<CallLog>>,
    acquisitions: AtomicUsize,
    fail_after: Option<usize>,
    error_message: String,
}

impl Default for MockSessionManager {
    fn default() -> Self {
        Self::new(MockScript::default())
    }
}

impl MockSessionManager {
    /// Manager whose pages all answer from `script`.
    pub fn new(script: MockScript) -> Self {
        Self {
            script,
            counters: Arc::new(SessionCounters::new()),
            pages: Mutex::new(Vec::new()),
            acquisitions: AtomicUsize::new(0),
            fail_after: None,
            error_message: String::new(),
        }
    }

    /// Fail every acquisition with `message`.
    pub fn unavailable<S: Into<String>>(self, message: S) -> Self {
        self.failing_after(0, message)
    }

    /// Allow `n` acquisitions, then fail the rest with `message`.
    pub fn failing_after<S: Into<String>>(mut self, n: usize, message: S) -> Self {
        self.fail_after = Some(n);
        self.error_message = message.into();
        self
    }

    /// Call logs of every page handed out, in acquisition order.
    pub fn page_calls(&self) -> Vec<Vec<PageCall>> {
        self.pages
            .lock()
            .map(|pages| {
                pages
                    .iter()
                    .map(|log| log.lock().map(|c| c.clone()).unwrap_or_default())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of acquisition attempts, successful or not.
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }
}

impl BrowserSessionManager for MockSessionManager {
    fn acquire_page(&self) -> Result<PageSession> {
        let attempt = self.acquisitions.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|n| attempt >= n) {
            return Err(ConvertError::EngineUnavailable(self.error_message.clone()));
        }

        let page = MockPage::new(self.script.clone());
        if let Ok(mut pages) = self.pages.lock() {
            pages.push(page.call_log());
        }

        Ok(PageSession::new(Box::new(page), Arc::clone(&self.counters)))
    }

    fn stats(&self) -> SessionStats {
        self.counters.snapshot()
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
