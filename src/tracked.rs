//! Long-lived browser with identity and age.
//!
//! [`TrackedBrowser`] wraps the process held by
//! [`SharedInstanceLifecycle`](crate::SharedInstanceLifecycle) and records
//! when it was launched, so the lifecycle can retire it once its TTL has
//! passed.
//!
//! ```text
//! TrackedBrowser
//! ├── id: u64 (for logs)
//! ├── browser: Arc<Browser> (shared with every open ChromePage)
//! └── created_at: Instant (TTL)
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use headless_chrome::Browser;

use crate::error::{ConvertError, Result};
use crate::traits::Healthcheck;

/// A launched browser with id and creation time.
#[derive(Clone)]
pub(crate) struct TrackedBrowser {
    id: u64,
    browser: Arc<Browser>,
    created_at: Instant,
}

impl TrackedBrowser {
    /// Accept a freshly launched browser after validating it.
    ///
    /// Opens a tab, loads `about:blank`, and closes it again. A browser
    /// that cannot do this is never handed pages.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::EngineUnavailable`] if validation fails.
    pub(crate) fn new(browser: Browser) -> Result<Self> {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);

        let browser = Arc::new(browser);
        let id = NEXT_ID.fetch_add(1, Ordering::SeqCst);

        log::debug!("Validating browser {}...", id);
        let tab = browser.new_tab().map_err(|e| {
            log::error!("❌ Browser {} validation failed at new_tab(): {}", id, e);
            ConvertError::EngineUnavailable(e.to_string())
        })?;

        let navigated = tab
            .navigate_to("about:blank")
            .and_then(|tab| tab.wait_until_navigated().map(|_| ()));
        close_scratch_tab(id, tab.close(true));
        navigated.map_err(|e| {
            log::error!("❌ Browser {} validation failed at navigate_to(): {}", id, e);
            ConvertError::EngineUnavailable(e.to_string())
        })?;

        log::debug!("✅ Browser {} validated", id);
        Ok(Self {
            id,
            browser,
            created_at: Instant::now(),
        })
    }

    #[inline]
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub(crate) fn browser(&self) -> &Arc<Browser> {
        &self.browser
    }

    /// Whether the browser has outlived `ttl`.
    #[inline]
    pub(crate) fn is_expired(&self, ttl: Duration) -> bool {
        is_past_ttl(self.age(), ttl)
    }

    #[inline]
    pub(crate) fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}

/// An age equal to the TTL is still live.
#[inline]
fn is_past_ttl(age: Duration, ttl: Duration) -> bool {
    age > ttl
}

impl Healthcheck for TrackedBrowser {
    /// Open and close a tab.
    fn ping(&self) -> Result<()> {
        log::trace!("Pinging browser {}...", self.id);

        let tab = self.browser.new_tab().map_err(|e| {
            log::warn!("⚠️ Browser {} ping failed: {}", self.id, e);
            ConvertError::EngineUnavailable(e.to_string())
        })?;
        close_scratch_tab(self.id, tab.close(true));

        log::trace!("✅ Browser {} ping successful", self.id);
        Ok(())
    }
}

/// Report how closing a validation or ping tab went.
///
/// A tab that will not close does not fail the browser; it is logged and
/// left for Chrome to reap with the process. Returns whether it closed.
fn close_scratch_tab<E: std::fmt::Display>(
    browser_id: u64,
    closed: std::result::Result<bool, E>,
) -> bool {
    match closed {
        Ok(true) => true,
        Ok(false) => {
            log::warn!("⚠️ Browser {} did not confirm scratch tab close", browser_id);
            false
        }
        Err(e) => {
            log::warn!("⚠️ Failed to close scratch tab of browser {}: {}", browser_id, e);
            false
        }
    }
}

impl std::fmt::Debug for TrackedBrowser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackedBrowser")
            .field("id", &self.id)
            .field("age_secs", &self.age().as_secs())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
