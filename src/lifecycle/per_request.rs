//! One browser process per page.

use std::sync::Arc;

use super::{BrowserSessionManager, engine_unavailable};
use crate::driver::ChromePage;
use crate::error::{ConvertError, Result};
use crate::factory::BrowserFactory;
use crate::session::PageSession;
use crate::stats::{SessionCounters, SessionStats};

/// Launches a dedicated browser for every page.
///
/// The page holds the only reference to its browser, so closing the page
/// ends the process. Nothing outlives a request, which makes this the
/// simplest lifecycle to reason about, at the price of a browser launch per
/// page (two for width-only HTML requests, which also open a probe page).
pub struct PerRequestLifecycle {
    factory: Box<dyn BrowserFactory>,
    counters: Arc<SessionCounters>,
}

impl PerRequestLifecycle {
    /// Lifecycle launching browsers from `factory`.
    pub fn new(factory: Box<dyn BrowserFactory>) -> Self {
        Self {
            factory,
            counters: Arc::new(SessionCounters::new()),
        }
    }
}

impl BrowserSessionManager for PerRequestLifecycle {
    fn acquire_page(&self) -> Result<PageSession> {
        let browser = Arc::new(self.factory.create().map_err(engine_unavailable)?);
        self.counters.record_browser_launched();

        let tab = browser.new_tab().map_err(|e| {
            log::error!("❌ Failed to open a page in a fresh browser: {}", e);
            ConvertError::EngineUnavailable(format!("could not open page: {}", e))
        })?;

        Ok(PageSession::new(
            Box::new(ChromePage::new(tab, browser)),
            Arc::clone(&self.counters),
        ))
    }

    fn stats(&self) -> SessionStats {
        self.counters.snapshot()
    }

    fn name(&self) -> &'static str {
        "per-request"
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
