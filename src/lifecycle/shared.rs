//! One long-lived browser, one tab per page.
//!
//! # Browser Replacement
//!
//! ```text
//! acquire_page()
//!       │
//!       ├── no browser / TTL passed ──→ launch + validate (under lock)
//!       │
//!       ├── new_tab() ok ──→ PageSession (holds Arc<Browser>)
//!       │
//!       └── new_tab() failed ──→ drop browser, EngineUnavailable
//!                                (next acquisition relaunches)
//! ```
//!
//! A retired browser is only dropped from the slot. Pages still open on it
//! hold their own `Arc<Browser>`, so the process lives until the last of
//! them closes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::{BrowserSessionManager, engine_unavailable};
use crate::driver::ChromePage;
use crate::error::{ConvertError, Result};
use crate::factory::BrowserFactory;
use crate::session::PageSession;
use crate::stats::{SessionCounters, SessionStats};
use crate::tracked::TrackedBrowser;
use crate::traits::Healthcheck;

/// Serves every page from one browser, relaunched after `ttl`.
///
/// Each page is its own tab, so pages never share DOM or script state.
/// Cookies, cache and storage are shared across requests; use
/// [`PerRequestLifecycle`](super::PerRequestLifecycle) when that matters.
pub struct SharedInstanceLifecycle {
    factory: Box<dyn BrowserFactory>,
    ttl: Duration,
    current: Mutex<Option<TrackedBrowser>>,
    counters: Arc<SessionCounters>,
    shutting_down: AtomicBool,
}

impl SharedInstanceLifecycle {
    /// Lifecycle launching from `factory` and retiring browsers after `ttl`.
    ///
    /// The first browser is launched by [`warmup`](BrowserSessionManager::warmup)
    /// or the first acquisition, whichever comes first.
    pub fn new(factory: Box<dyn BrowserFactory>, ttl: Duration) -> Self {
        Self {
            factory,
            ttl,
            current: Mutex::new(None),
            counters: Arc::new(SessionCounters::new()),
            shutting_down: AtomicBool::new(false),
        }
    }

    fn slot(&self) -> Result<MutexGuard<'_, Option<TrackedBrowser>>> {
        self.current.lock().map_err(|_| {
            log::error!("❌ Shared browser lock poisoned");
            ConvertError::EngineUnavailable("shared browser lock poisoned".to_string())
        })
    }

    /// The live browser, launching a replacement if needed.
    fn current_browser(&self) -> Result<TrackedBrowser> {
        let mut slot = self.slot()?;

        if let Some(tracked) = slot.as_ref() {
            if !tracked.is_expired(self.ttl) {
                return Ok(tracked.clone());
            }
            log::info!(
                "♻️ Retiring browser {} after {}s (TTL {}s)",
                tracked.id(),
                tracked.age().as_secs(),
                self.ttl.as_secs()
            );
            *slot = None;
        }

        let browser = self.factory.create().map_err(engine_unavailable)?;
        self.counters.record_browser_launched();
        let tracked = TrackedBrowser::new(browser)?;
        log::info!("✅ Shared browser {} launched", tracked.id());

        *slot = Some(tracked.clone());
        Ok(tracked)
    }

    /// Drop browser `id` from the slot if it is still the current one.
    fn invalidate(&self, id: u64) {
        if let Ok(mut slot) = self.current.lock() {
            if slot.as_ref().is_some_and(|t| t.id() == id) {
                log::warn!("⚠️ Dropping unresponsive browser {}", id);
                *slot = None;
            }
        }
    }

    fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }
}

impl BrowserSessionManager for SharedInstanceLifecycle {
    fn acquire_page(&self) -> Result<PageSession> {
        if self.is_shutting_down() {
            return Err(ConvertError::EngineUnavailable(
                "session manager is shutting down".to_string(),
            ));
        }

        let tracked = self.current_browser()?;
        let tab = tracked.browser().new_tab().map_err(|e| {
            log::error!("❌ Browser {} could not open a page: {}", tracked.id(), e);
            self.invalidate(tracked.id());
            ConvertError::EngineUnavailable(format!("could not open page: {}", e))
        })?;

        Ok(PageSession::new(
            Box::new(ChromePage::new(tab, Arc::clone(tracked.browser()))),
            Arc::clone(&self.counters),
        ))
    }

    fn stats(&self) -> SessionStats {
        self.counters.snapshot()
    }

    fn name(&self) -> &'static str {
        "shared"
    }

    /// Ping the current browser.
    ///
    /// False before the first launch, after shutdown, or if the ping fails.
    fn is_ready(&self) -> bool {
        if self.is_shutting_down() {
            return false;
        }
        let current = match self.slot() {
            Ok(slot) => slot.clone(),
            Err(_) => return false,
        };
        current.is_some_and(|tracked| tracked.ping().is_ok())
    }

    fn warmup(&self) -> Result<()> {
        self.current_browser()?.ping()
    }

    fn shutdown(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
        if let Ok(mut slot) = self.current.lock() {
            if let Some(tracked) = slot.take() {
                log::info!("🛑 Releasing shared browser {}", tracked.id());
            }
        }
        log::info!("✅ Session manager shut down - {}", self.counters.snapshot());
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
