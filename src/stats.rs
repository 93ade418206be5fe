//! Session statistics for monitoring and leak detection.
//!
//! This module provides [`SessionCounters`], the live atomic counters a
//! session manager updates as pages are opened and closed, and
//! [`SessionStats`], a snapshot of them.
//!
//! `open_pages` returning to zero once all conversions have finished is the
//! primary signal that no page leaked.
//!
//! # Example
//!
//! ```rust
//! use html2pdf_render::SessionStats;
//!
//! let stats = SessionStats {
//!     pages_opened: 10,
//!     pages_closed: 10,
//!     browsers_launched: 1,
//! };
//!
//! assert_eq!(stats.open_pages(), 0);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Live counters shared between a session manager and its sessions.
#[derive(Debug, Default)]
pub struct SessionCounters {
    pages_opened: AtomicU64,
    pages_closed: AtomicU64,
    browsers_launched: AtomicU64,
}

impl SessionCounters {
    /// Fresh counters, all zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_page_opened(&self) {
        self.pages_opened.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_page_closed(&self) {
        self.pages_closed.fetch_add(1, Ordering::SeqCst);
    }

    /// Count a browser process launch.
    pub fn record_browser_launched(&self) {
        self.browsers_launched.fetch_add(1, Ordering::SeqCst);
    }

    /// Take a snapshot.
    pub fn snapshot(&self) -> SessionStats {
        SessionStats {
            pages_opened: self.pages_opened.load(Ordering::SeqCst),
            pages_closed: self.pages_closed.load(Ordering::SeqCst),
            browsers_launched: self.browsers_launched.load(Ordering::SeqCst),
        }
    }
}

/// Snapshot of session counters at a point in time.
///
/// # Fields
///
/// | Field | Description |
/// |-------|-------------|
/// | `pages_opened` | Pages handed out since startup |
/// | `pages_closed` | Pages released since startup |
/// | `browsers_launched` | Browser processes started since startup |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionStats {
    /// Pages handed out since startup.
    pub pages_opened: u64,

    /// Pages released since startup.
    pub pages_closed: u64,

    /// Browser processes started since startup.
    pub browsers_launched: u64,
}

impl SessionStats {
    /// Pages currently held by in-flight conversions.
    #[inline]
    pub fn open_pages(&self) -> u64 {
        self.pages_opened.saturating_sub(self.pages_closed)
    }

    /// Whether no page is currently open.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.open_pages() == 0
    }
}

impl std::fmt::Display for SessionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SessionStats {{ opened: {}, closed: {}, open: {}, browsers: {} }}",
            self.pages_opened,
            self.pages_closed,
            self.open_pages(),
            self.browsers_launched
        )
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
