//! Chrome/Chromium browser factory.
//!
//! [`ChromeBrowserFactory`] launches headless Chrome with flags tuned for
//! printing inside containers: no sandbox, no GPU, hidden scrollbars, and
//! unhinted font rendering so measured heights match the printed layout.

use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions};

use super::BrowserFactory;
use crate::error::{ConvertError, Result};

/// How long Chrome may sit without DevTools traffic before
/// `headless_chrome` tears down the connection.
///
/// Kept above the default browser TTL so a quiet shared browser is retired
/// by the lifecycle manager, not by the transport.
pub const DEFAULT_IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(2 * 3600);

type LaunchOptionsFn = Box<dyn Fn() -> Result<LaunchOptions<'static>> + Send + Sync>;

/// Factory for headless Chrome processes.
///
/// # Example
///
/// ```rust,ignore
/// use html2pdf_render::ChromeBrowserFactory;
///
/// // Let headless_chrome find (or fetch) a binary
/// let factory = ChromeBrowserFactory::with_defaults();
///
/// // Or pin one
/// let factory = ChromeBrowserFactory::with_path("/usr/bin/chromium".to_string());
/// ```
pub struct ChromeBrowserFactory {
    launch_options_fn: LaunchOptionsFn,
}

impl ChromeBrowserFactory {
    /// Factory calling `launch_options_fn` before every launch.
    pub fn new<F>(launch_options_fn: F) -> Self
    where
        F: Fn() -> Result<LaunchOptions<'static>> + Send + Sync + 'static,
    {
        Self {
            launch_options_fn: Box::new(launch_options_fn),
        }
    }

    /// Factory with an auto-detected Chrome binary.
    pub fn with_defaults() -> Self {
        log::debug!("Creating ChromeBrowserFactory with auto-detect");
        Self::new(|| create_chrome_options(None, DEFAULT_IDLE_BROWSER_TIMEOUT))
    }

    /// Factory launching the binary at `chrome_path`.
    pub fn with_path(chrome_path: String) -> Self {
        log::debug!("Creating ChromeBrowserFactory with custom path: {}", chrome_path);
        Self::new(move || create_chrome_options(Some(&chrome_path), DEFAULT_IDLE_BROWSER_TIMEOUT))
    }

    /// Factory for an optional binary path and a transport idle timeout.
    ///
    /// Used by the lifecycle builders, which size `idle_timeout` from the
    /// configured browser TTL.
    pub fn with_options(chrome_path: Option<String>, idle_timeout: Duration) -> Self {
        Self::new(move || create_chrome_options(chrome_path.as_deref(), idle_timeout))
    }
}

impl BrowserFactory for ChromeBrowserFactory {
    fn create(&self) -> Result<Browser> {
        let options = (self.launch_options_fn)()?;

        log::debug!("Launching Chrome browser...");
        Browser::new(options).map_err(|e| {
            log::error!("❌ Chrome launch failed: {}", e);
            ConvertError::EngineUnavailable(format!("failed to launch Chrome: {}", e))
        })
    }
}

/// Build launch options for headless printing.
///
/// # Flags
///
/// - `--disable-dev-shm-usage`, `--disable-crash-reporter`: container friendly
/// - `--disable-gpu-compositing`, `--disable-software-rasterizer`,
///   `--disable-webgl`: no GPU in headless printing
/// - `--hide-scrollbars`: scrollbars must not eat into measured width
/// - `--font-render-hinting=none`: same glyph metrics in probe and print
/// - `--disable-background-timer-throttling`,
///   `--disable-renderer-backgrounding`: background tabs keep loading
///
/// # Errors
///
/// Returns [`ConvertError::Configuration`] if the builder rejects the
/// options.
pub fn create_chrome_options(
    chrome_path: Option<&str>,
    idle_timeout: Duration,
) -> Result<LaunchOptions<'static>> {
    let mut builder = LaunchOptions::default_builder();

    match chrome_path {
        Some(path) => {
            log::debug!("Chrome path set to: {}", path);
            builder.path(Some(path.into()));
        }
        None => log::trace!("Chrome path: auto-detect"),
    }

    builder
        .headless(true)
        .sandbox(false)
        .idle_browser_timeout(idle_timeout)
        .args(vec![
            "--disable-dev-shm-usage".as_ref(),
            "--disable-crash-reporter".as_ref(),
            "--disable-gpu-compositing".as_ref(),
            "--disable-software-rasterizer".as_ref(),
            "--disable-webgl".as_ref(),
            "--disable-extensions".as_ref(),
            "--disable-sync".as_ref(),
            "--hide-scrollbars".as_ref(),
            "--font-render-hinting=none".as_ref(),
            "--disable-background-timer-throttling".as_ref(),
            "--disable-backgrounding-occluded-windows".as_ref(),
            "--disable-renderer-backgrounding".as_ref(),
        ])
        .build()
        .map_err(|e| {
            log::error!(
                "❌ Failed to build Chrome launch options (path: {}): {}",
                chrome_path.unwrap_or("auto-detect"),
                e
            );
            ConvertError::Configuration(e.to_string())
        })
}

// ============================================================================
// Unit Tests
// ============================================================================
