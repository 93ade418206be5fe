//! Scoped page ownership.
//!
//! This module provides [`PageSession`], which owns one page and closes it
//! when dropped, and two role types built on it:
//!
//! - [`ExportPage`]: the page a document is loaded into and printed from.
//! - [`ProbePage`]: a throwaway page used only to measure content height.
//!
//! # Overview
//!
//! Release is tied to scope, so a page is closed on every exit path:
//! - Normal completion
//! - An early `?` return on any error
//! - A panic unwinding through the conversion
//!
//! # Why Two Role Types
//!
//! The probe page is sized to a 10px tall viewport. If it were ever reused
//! for export, that viewport would distort the printed layout. Each role is
//! a separate type and each one comes from its own
//! [`acquire_page()`](crate::BrowserSessionManager::acquire_page) call, so
//! the two can never be the same page:
//!
//! ```rust,ignore
//! let export = ExportPage::acquire(manager)?;
//! let probe = ProbePage::acquire(manager)?;
//!
//! fn print(page: &ExportPage) { /* ... */ }
//! print(&probe); // does not compile
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::driver::PageDriver;
use crate::error::Result;
use crate::lifecycle::BrowserSessionManager;
use crate::stats::SessionCounters;

/// One acquired page, closed on drop.
///
/// Derefs to [`PageDriver`], so it can be passed anywhere a
/// `&dyn PageDriver` is expected.
pub struct PageSession {
    id: u64,
    opened_at: Instant,
    driver: Box<dyn PageDriver>,
    counters: Arc<SessionCounters>,
}

impl PageSession {
    /// Take ownership of an open page.
    ///
    /// Counts the page as opened in `counters`; dropping the session counts
    /// it as closed. Session managers call this; conversions should go
    /// through [`BrowserSessionManager::acquire_page`].
    pub fn new(driver: Box<dyn PageDriver>, counters: Arc<SessionCounters>) -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);

        let id = NEXT_ID.fetch_add(1, Ordering::SeqCst);
        counters.record_page_opened();
        log::trace!("Page session {} opened", id);

        Self {
            id,
            opened_at: Instant::now(),
            driver,
            counters,
        }
    }

    /// Process-unique session id, for logs and tests.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Time since the page was acquired.
    #[inline]
    pub fn age(&self) -> Duration {
        self.opened_at.elapsed()
    }

    /// The underlying page driver.
    #[inline]
    pub fn driver(&self) -> &dyn PageDriver {
        self.driver.as_ref()
    }
}

impl std::ops::Deref for PageSession {
    type Target = dyn PageDriver;

    fn deref(&self) -> &Self::Target {
        self.driver.as_ref()
    }
}

impl Drop for PageSession {
    /// Close the page.
    ///
    /// A failed close is logged and otherwise ignored: by now the
    /// conversion has either produced its bytes or its error.
    fn drop(&mut self) {
        if let Err(e) = self.driver.close() {
            log::warn!("⚠️ Failed to close page session {}: {}", self.id, e);
        }
        self.counters.record_page_closed();
        log::trace!(
            "Page session {} closed after {:?}",
            self.id,
            self.opened_at.elapsed()
        );
    }
}

impl std::fmt::Debug for PageSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageSession")
            .field("id", &self.id)
            .field("age", &self.age())
            .finish_non_exhaustive()
    }
}

/// The page a document is loaded into and printed from.
#[derive(Debug)]
pub struct ExportPage(PageSession);

impl ExportPage {
    /// Acquire a fresh page for export.
    pub fn acquire(manager: &dyn BrowserSessionManager) -> Result<Self> {
        manager.acquire_page().map(Self)
    }
}

impl std::ops::Deref for ExportPage {
    type Target = PageSession;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A throwaway page used only to measure content height.
#[derive(Debug)]
pub struct ProbePage(PageSession);

impl ProbePage {
    /// Acquire a fresh page for measurement.
    pub fn acquire(manager: &dyn BrowserSessionManager) -> Result<Self> {
        manager.acquire_page().map(Self)
    }
}

impl std::ops::Deref for ProbePage {
    type Target = PageSession;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
