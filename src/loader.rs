//! Content loading and settling.
//!
//! Brings a page to a stable, measurable state before it is measured or
//! printed. Two ways in:
//!
//! - [`load_url`] navigates to a remote page and waits for the caller's
//!   [`WaitUntil`] condition within the caller's timeout.
//! - [`set_content`] opens `about:blank`, replaces its document with the
//!   inline HTML over DevTools and always waits for network idle. The HTML
//!   never travels in a URL, so its size is not bound by URL length limits.
//!
//! Either way, callers then run [`wait_for_fonts`], since layout height and
//! print output both shift while web fonts are still swapping in.
//!
//! # Wait Conditions
//!
//! Conditions are checked by polling small JavaScript expressions:
//!
//! | Condition | Satisfied when |
//! |-----------|----------------|
//! | `Load` | `document.readyState === "complete"` |
//! | `DomContentLoaded` | `document.readyState !== "loading"` |
//! | `NetworkIdle` | `complete`, and no new resource timing entries for 500ms |

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::driver::{DriverError, PageDriver};
use crate::error::{ConvertError, Result};

/// Default navigation timeout for URL mode.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Fixed timeout for inline content, regardless of what the caller asked for.
pub const INLINE_CONTENT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Upper bound on waiting for `document.fonts` to settle.
pub const FONT_READY_TIMEOUT: Duration = Duration::from_millis(30_000);

/// How long the resource count must stay unchanged to count as network idle.
pub const NETWORK_QUIET_WINDOW: Duration = Duration::from_millis(500);

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub(crate) const READY_STATE_JS: &str = "document.readyState";
pub(crate) const RESOURCE_COUNT_JS: &str = "performance.getEntriesByType('resource').length";
pub(crate) const FONTS_STATUS_JS: &str = "document.fonts ? document.fonts.status : 'loaded'";

// ============================================================================
// Request-facing enums
// ============================================================================

/// When a navigation counts as finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitUntil {
    /// The `load` event has fired.
    Load,
    /// The DOM has been parsed.
    #[serde(rename = "domcontentloaded")]
    DomContentLoaded,
    /// Loaded, and no new network requests for [`NETWORK_QUIET_WINDOW`].
    #[default]
    #[serde(rename = "networkidle")]
    NetworkIdle,
}

impl std::fmt::Display for WaitUntil {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Load => "load",
            Self::DomContentLoaded => "domcontentloaded",
            Self::NetworkIdle => "networkidle",
        })
    }
}

/// CSS media type the page is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// `@media screen` rules apply.
    #[default]
    Screen,
    /// `@media print` rules apply.
    Print,
}

impl MediaType {
    /// CSS name of the media type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Screen => "screen",
            Self::Print => "print",
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Navigate `page` to `url` and wait for `wait_until`.
///
/// `timeout` bounds navigation and the wait condition together.
///
/// # Errors
///
/// - [`ConvertError::NavigationTimeout`] if the condition is not met in time
/// - [`ConvertError::NavigationError`] for network, DNS or certificate failures
pub fn load_url(
    page: &dyn PageDriver,
    url: &str,
    wait_until: WaitUntil,
    timeout: Duration,
) -> Result<()> {
    let start = Instant::now();
    log::trace!(
        "Loading {} (wait_until={}, timeout={}ms)",
        truncate_for_log(url, 100),
        wait_until,
        timeout.as_millis()
    );

    page.navigate(url, timeout).map_err(navigation_error)?;
    wait_for_load_state(page, wait_until, timeout.saturating_sub(start.elapsed()))?;

    log::debug!("Page loaded in {:?}", start.elapsed());
    Ok(())
}

/// Blank document inline content is injected into.
pub const BLANK_PAGE_URL: &str = "about:blank";

/// Replace the page content with `html` and wait for network idle.
///
/// # Errors
///
/// Same as [`load_url`].
pub fn set_content(page: &dyn PageDriver, html: &str, timeout: Duration) -> Result<()> {
    let start = Instant::now();
    log::trace!("Setting inline content ({} bytes html)", html.len());

    page.navigate(BLANK_PAGE_URL, timeout).map_err(navigation_error)?;
    page.set_document_content(html).map_err(navigation_error)?;
    wait_for_load_state(
        page,
        WaitUntil::NetworkIdle,
        timeout.saturating_sub(start.elapsed()),
    )?;

    log::debug!("Inline content settled in {:?}", start.elapsed());
    Ok(())
}

/// Wait until `document.fonts` reports every font as loaded.
///
/// # Errors
///
/// Returns [`ConvertError::NavigationTimeout`] if fonts are still loading
/// when `timeout` elapses.
pub fn wait_for_fonts(page: &dyn PageDriver, timeout: Duration) -> Result<()> {
    let start = Instant::now();

    poll_until(timeout, || {
        Ok(read_string(page, FONTS_STATUS_JS).as_deref() == Some("loaded"))
    })
    .map_err(|_| {
        ConvertError::NavigationTimeout(format!(
            "fonts not ready within {}ms",
            timeout.as_millis()
        ))
    })?;

    log::trace!("Fonts ready after {:?}", start.elapsed());
    Ok(())
}

fn wait_for_load_state(
    page: &dyn PageDriver,
    wait_until: WaitUntil,
    timeout: Duration,
) -> Result<()> {
    let mut idle = IdleTracker::default();

    poll_until(timeout, || {
        let ready_state = read_string(page, READY_STATE_JS);
        let satisfied = match wait_until {
            WaitUntil::DomContentLoaded => {
                matches!(ready_state.as_deref(), Some(state) if state != "loading")
            }
            WaitUntil::Load => ready_state.as_deref() == Some("complete"),
            WaitUntil::NetworkIdle => {
                let resources = read_u64(page, RESOURCE_COUNT_JS);
                ready_state.as_deref() == Some("complete")
                    && resources.is_some_and(|count| idle.observe(count, Instant::now()))
            }
        };
        Ok(satisfied)
    })
    .map_err(|_| {
        ConvertError::NavigationTimeout(format!(
            "'{}' not reached within {}ms",
            wait_until,
            timeout.as_millis()
        ))
    })
}

/// Poll `check` until it returns `true`. `Err(())` means the time ran out.
fn poll_until<F>(timeout: Duration, mut check: F) -> std::result::Result<(), ()>
where
    F: FnMut() -> std::result::Result<bool, ()>,
{
    let start = Instant::now();
    loop {
        if check()? {
            return Ok(());
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Err(());
        }
        std::thread::sleep(POLL_INTERVAL.min(timeout - elapsed));
    }
}

// Evaluation errors (e.g. the execution context being replaced mid-load)
// count as "not yet" rather than failing the wait.
fn read_string(page: &dyn PageDriver, expression: &str) -> Option<String> {
    match page.evaluate(expression) {
        Ok(value) => value.and_then(|v| v.as_str().map(str::to_string)),
        Err(e) => {
            log::trace!("Evaluating '{}' failed: {}", expression, e);
            None
        }
    }
}

fn read_u64(page: &dyn PageDriver, expression: &str) -> Option<u64> {
    match page.evaluate(expression) {
        Ok(value) => value.and_then(|v| v.as_u64()),
        Err(e) => {
            log::trace!("Evaluating '{}' failed: {}", expression, e);
            None
        }
    }
}

fn navigation_error(error: DriverError) -> ConvertError {
    match error {
        DriverError::Timeout(msg) => ConvertError::NavigationTimeout(msg),
        DriverError::Failed(msg) => ConvertError::NavigationError(msg),
    }
}

/// Tracks how long the resource count has stayed unchanged.
#[derive(Debug, Default)]
struct IdleTracker {
    last_count: Option<u64>,
    quiet_since: Option<Instant>,
}

impl IdleTracker {
    /// Record a resource count; returns `true` once it has been stable for
    /// [`NETWORK_QUIET_WINDOW`].
    fn observe(&mut self, count: u64, now: Instant) -> bool {
        if self.last_count != Some(count) {
            self.last_count = Some(count);
            self.quiet_since = Some(now);
            return false;
        }
        self.quiet_since
            .is_some_and(|since| now.saturating_duration_since(since) >= NETWORK_QUIET_WINDOW)
    }
}

/// Truncate long URLs for log output.
pub(crate) fn truncate_for_log(url: &str, max_chars: usize) -> String {
    match url.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &url[..idx]),
        None => url.to_string(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::{MockPage, MockScript, PageCall};

    /// Verifies wait condition names match the JSON wire values.
    #[test]
    fn test_wait_until_serde() {
        let parsed: WaitUntil = serde_json::from_str("\"domcontentloaded\"").unwrap();
        assert_eq!(parsed, WaitUntil::DomContentLoaded);
        let parsed: WaitUntil = serde_json::from_str("\"networkidle\"").unwrap();
        assert_eq!(parsed, WaitUntil::NetworkIdle);
        let parsed: WaitUntil = serde_json::from_str("\"load\"").unwrap();
        assert_eq!(parsed, WaitUntil::Load);
        assert_eq!(WaitUntil::default(), WaitUntil::NetworkIdle);
    }

    /// Verifies media type names.
    #[test]
    fn test_media_type() {
        let parsed: MediaType = serde_json::from_str("\"print\"").unwrap();
        assert_eq!(parsed, MediaType::Print);
        assert_eq!(MediaType::default().as_str(), "screen");
    }

    /// Verifies idle detection needs a stable count for the whole window.
    #[test]
    fn test_idle_tracker() {
        let start = Instant::now();
        let mut idle = IdleTracker::default();

        assert!(!idle.observe(3, start));
        assert!(!idle.observe(3, start + Duration::from_millis(200)));
        // A new request resets the window.
        assert!(!idle.observe(4, start + Duration::from_millis(300)));
        assert!(!idle.observe(4, start + Duration::from_millis(700)));
        assert!(idle.observe(4, start + Duration::from_millis(800)));
    }

    /// Verifies URL loading navigates once and succeeds on a complete page.
    #[test]
    fn test_load_url_load_condition() {
        let page = MockPage::new(MockScript::default());
        load_url(
            &page,
            "https://example.com/",
            WaitUntil::Load,
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(
            page.calls(),
            vec![PageCall::Navigate("https://example.com/".to_string())]
        );
    }

    /// Verifies DOMContentLoaded accepts an interactive document.
    #[test]
    fn test_load_url_dom_content_loaded() {
        let script = MockScript {
            ready_state: "interactive".to_string(),
            ..MockScript::default()
        };
        let page = MockPage::new(script);

        let result = load_url(
            &page,
            "https://example.com/",
            WaitUntil::DomContentLoaded,
            Duration::from_secs(1),
        );
        assert!(result.is_ok());
    }

    /// Verifies a page stuck loading times out as NavigationTimeout.
    #[test]
    fn test_load_url_condition_timeout() {
        let script = MockScript {
            ready_state: "loading".to_string(),
            ..MockScript::default()
        };
        let page = MockPage::new(script);

        let err = load_url(
            &page,
            "https://example.com/",
            WaitUntil::Load,
            Duration::from_millis(250),
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::NavigationTimeout(_)), "got {:?}", err);
    }

    /// Verifies driver navigation failures keep their kind.
    #[test]
    fn test_load_url_driver_errors() {
        let script = MockScript {
            navigate_error: Some(DriverError::Failed("net::ERR_NAME_NOT_RESOLVED".to_string())),
            ..MockScript::default()
        };
        let err = load_url(
            &MockPage::new(script),
            "https://nope.invalid/",
            WaitUntil::Load,
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConvertError::NavigationError("net::ERR_NAME_NOT_RESOLVED".to_string())
        );

        let script = MockScript {
            navigate_error: Some(DriverError::Timeout("navigation".to_string())),
            ..MockScript::default()
        };
        let err = load_url(
            &MockPage::new(script),
            "https://slow.example/",
            WaitUntil::Load,
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert_eq!(err, ConvertError::NavigationTimeout("navigation".to_string()));
    }

    /// Verifies inline content is injected into a blank page, not a URL.
    #[test]
    fn test_set_content_injects_document() {
        let page = MockPage::new(MockScript::default());
        set_content(&page, "<p>hi there</p>", INLINE_CONTENT_TIMEOUT).unwrap();

        assert_eq!(
            page.calls(),
            vec![
                PageCall::Navigate(BLANK_PAGE_URL.to_string()),
                PageCall::SetDocumentContent("<p>hi there</p>".to_string()),
            ]
        );
    }

    /// Verifies multi-megabyte documents go through unchanged.
    #[test]
    fn test_set_content_large_document() {
        // an inline base64 image pushes templates well past 2MB of URL
        let image = "iVBORw0KGgo".repeat(150_000);
        let html = format!("<img src=\"data:image/png;base64,{}\">", image);
        assert!(html.len() > 1_500_000);

        let page = MockPage::new(MockScript::default());
        set_content(&page, &html, INLINE_CONTENT_TIMEOUT).unwrap();

        let calls = page.calls();
        assert_eq!(calls[0], PageCall::Navigate(BLANK_PAGE_URL.to_string()));
        match &calls[1] {
            PageCall::SetDocumentContent(content) => assert_eq!(content.len(), html.len()),
            other => panic!("unexpected call {:?}", other),
        }
    }

    /// Verifies content injection failures map like navigation failures.
    #[test]
    fn test_set_content_injection_error() {
        let script = MockScript {
            content_error: Some(DriverError::Failed("No frame with given id".to_string())),
            ..MockScript::default()
        };

        let err = set_content(&MockPage::new(script), "<p>x</p>", INLINE_CONTENT_TIMEOUT)
            .unwrap_err();
        assert_eq!(
            err,
            ConvertError::NavigationError("No frame with given id".to_string())
        );
    }

    /// Verifies fonts that never settle time out.
    #[test]
    fn test_wait_for_fonts_timeout() {
        let script = MockScript {
            fonts_status: "loading".to_string(),
            ..MockScript::default()
        };
        let err = wait_for_fonts(&MockPage::new(script), Duration::from_millis(150)).unwrap_err();
        assert!(matches!(err, ConvertError::NavigationTimeout(_)));
    }

    /// Verifies loaded fonts return immediately.
    #[test]
    fn test_wait_for_fonts_ready() {
        let page = MockPage::new(MockScript::default());
        assert!(wait_for_fonts(&page, Duration::from_millis(50)).is_ok());
    }

    /// Verifies log truncation respects char boundaries.
    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short", 10), "short");
        assert_eq!(truncate_for_log("abcdef", 3), "abc...");
        assert_eq!(truncate_for_log("ééééé", 2), "éé...");
    }
}
