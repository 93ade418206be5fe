//! Browser session management.
//!
//! This module provides the [`BrowserSessionManager`] trait, through which
//! every conversion acquires its pages, and the two Chrome-backed
//! lifecycles:
//!
//! | Lifecycle | Browser per | Startup cost | Isolation |
//! |-----------|-------------|--------------|-----------|
//! | [`PerRequestLifecycle`] | page | every page | full |
//! | [`SharedInstanceLifecycle`] | service (until TTL) | once | per page |
//!
//! A per-request browser is its own process with its own cookies and cache.
//! Pages of the shared browser share cookies and cache.
//!
//! Pages are never shared between requests under either lifecycle.
//!
//! # Example
//!
//! ```rust,ignore
//! use html2pdf_render::{ServiceConfig, build_session_manager, warmup_session_manager};
//!
//! let config = ServiceConfig::default();
//! let manager = build_session_manager(&config);
//! warmup_session_manager(&manager, config.warmup_timeout).await?;
//!
//! let page = manager.acquire_page()?;
//! // ... page is closed when dropped ...
//! ```

mod per_request;
mod shared;

pub use per_request::PerRequestLifecycle;
pub use shared::SharedInstanceLifecycle;

use std::sync::Arc;
use std::time::Duration;

use crate::config::ServiceConfig;
use crate::error::{ConvertError, Result};
use crate::factory::{BrowserFactory, ChromeBrowserFactory};
use crate::session::PageSession;
use crate::stats::SessionStats;

/// Hands out fresh pages and tracks them.
///
/// # Thread Safety
///
/// Shared by every request thread, hence `Send + Sync`. Implementations
/// must make concurrent `acquire_page` calls safe.
pub trait BrowserSessionManager: Send + Sync {
    /// Open a fresh page.
    ///
    /// The page is closed when the returned session is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::EngineUnavailable`] if the browser cannot be
    /// started or a page cannot be opened.
    fn acquire_page(&self) -> Result<PageSession>;

    /// Current page and launch counters.
    fn stats(&self) -> SessionStats;

    /// Short lifecycle name reported by `/health`.
    fn name(&self) -> &'static str;

    /// Whether a page could be served right now.
    fn is_ready(&self) -> bool {
        true
    }

    /// Launch eagerly so the first request does not pay for it.
    ///
    /// Blocking; call from a blocking thread.
    fn warmup(&self) -> Result<()> {
        Ok(())
    }

    /// Stop serving pages and release held browsers.
    ///
    /// Pages already handed out stay usable until dropped.
    fn shutdown(&self) {}
}

/// Session manager shared between handlers.
pub type SharedSessionManager = Arc<dyn BrowserSessionManager>;

/// Which lifecycle serves pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleStrategy {
    /// One browser process per page.
    PerRequest,
    /// One long-lived browser, one tab per page.
    #[default]
    SharedInstance,
}

impl LifecycleStrategy {
    /// Name as used in `HTML2PDF_LIFECYCLE`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PerRequest => "per-request",
            Self::SharedInstance => "shared",
        }
    }
}

impl std::fmt::Display for LifecycleStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LifecycleStrategy {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per-request" | "per_request" => Ok(Self::PerRequest),
            "shared" | "shared-instance" | "shared_instance" => Ok(Self::SharedInstance),
            other => Err(ConvertError::Configuration(format!(
                "unknown lifecycle '{}': expected 'shared' or 'per-request'",
                other
            ))),
        }
    }
}

/// Fold any launch failure into [`ConvertError::EngineUnavailable`].
pub(crate) fn engine_unavailable(error: ConvertError) -> ConvertError {
    match error {
        ConvertError::EngineUnavailable(_) => error,
        other => ConvertError::EngineUnavailable(other.to_string()),
    }
}

/// Build the manager `config` asks for, backed by Chrome.
///
/// Nothing is launched yet; see [`warmup_session_manager`].
pub fn build_session_manager(config: &ServiceConfig) -> SharedSessionManager {
    let factory: Box<dyn BrowserFactory> = Box::new(ChromeBrowserFactory::with_options(
        config.chrome_path.clone(),
        config.browser_ttl.saturating_mul(2),
    ));

    match config.strategy {
        LifecycleStrategy::PerRequest => Arc::new(PerRequestLifecycle::new(factory)),
        LifecycleStrategy::SharedInstance => {
            Arc::new(SharedInstanceLifecycle::new(factory, config.browser_ttl))
        }
    }
}

/// Run [`BrowserSessionManager::warmup`] on a blocking thread, bounded by
/// `timeout`.
///
/// # Errors
///
/// - The manager's own warmup error
/// - [`ConvertError::EngineUnavailable`] if `timeout` elapses
/// - [`ConvertError::Internal`] if the warmup thread panics
pub async fn warmup_session_manager(
    manager: &SharedSessionManager,
    timeout: Duration,
) -> Result<()> {
    log::info!(
        "🔥 Warming up '{}' session manager (timeout: {}s)",
        manager.name(),
        timeout.as_secs()
    );

    let task = tokio::task::spawn_blocking({
        let manager = Arc::clone(manager);
        move || manager.warmup()
    });

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(Ok(()))) => {
            log::info!("✅ Warmup completed - {}", manager.stats());
            Ok(())
        }
        Ok(Ok(Err(e))) => {
            log::error!("❌ Warmup failed: {}", e);
            Err(e)
        }
        Ok(Err(join_error)) => {
            log::error!("❌ Warmup task failed: {}", join_error);
            Err(ConvertError::Internal(format!("warmup task failed: {}", join_error)))
        }
        Err(_) => {
            log::error!("❌ Warmup timed out after {}s", timeout.as_secs());
            Err(ConvertError::EngineUnavailable(format!(
                "warmup timed out after {}s",
                timeout.as_secs()
            )))
        }
    }
}

/// Build and warm the manager described by `config`.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = html2pdf_render::config::env::from_env()?;
///     let manager = html2pdf_render::init_session_manager(&config).await?;
///     // hand `manager` to the router...
///     Ok(())
/// }
/// ```
pub async fn init_session_manager(config: &ServiceConfig) -> Result<SharedSessionManager> {
    log::info!("Initializing '{}' session manager...", config.strategy);

    let manager = build_session_manager(config);
    warmup_session_manager(&manager, config.warmup_timeout).await?;

    log::info!("✅ Session manager ready - {}", manager.stats());
    Ok(manager)
}

// ============================================================================
// Unit Tests
// ============================================================================
