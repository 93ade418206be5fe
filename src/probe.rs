//! Content height measurement.
//!
//! Answers one question: how tall, in CSS pixels, is this HTML when laid
//! out at exactly `width_px` wide with unconstrained height?
//!
//! The HTML is rendered in its own [`ProbePage`] whose viewport is
//! `width_px` x 10. The tiny height means nothing is clipped by the
//! viewport and normal document flow decides the height. The page is closed
//! when measurement finishes, successfully or not.

use std::time::Instant;

use crate::driver::PageDriver;
use crate::error::{ConvertError, Result};
use crate::lifecycle::BrowserSessionManager;
use crate::loader::{FONT_READY_TIMEOUT, INLINE_CONTENT_TIMEOUT, set_content, wait_for_fonts};
use crate::session::ProbePage;

/// Viewport height used while measuring.
pub const PROBE_VIEWPORT_HEIGHT: u32 = 10;

pub(crate) const BODY_HEIGHT_JS: &str =
    "document.body ? document.body.getBoundingClientRect().height : null";

/// Rendered body height in whole CSS pixels.
///
/// Produced once per request and consumed immediately; never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasuredHeight(u32);

impl MeasuredHeight {
    /// Wrap a whole-pixel height.
    pub fn from_pixels(pixels: u32) -> Self {
        Self(pixels)
    }

    /// Round a layout height up to the next whole pixel.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::MeasurementError`] for negative or
    /// non-finite heights.
    pub fn from_layout_height(height: f64) -> Result<Self> {
        if !height.is_finite() || height < 0.0 || height > f64::from(u32::MAX) {
            return Err(ConvertError::MeasurementError(format!(
                "body reported an unusable height: {}",
                height
            )));
        }
        Ok(Self(height.ceil() as u32))
    }

    /// Height in pixels.
    #[inline]
    pub fn pixels(&self) -> u32 {
        self.0
    }
}

/// Measure `html` rendered at `width_px` in a dedicated probe page.
///
/// # Errors
///
/// - [`ConvertError::EngineUnavailable`] if the probe page cannot be opened
/// - [`ConvertError::NavigationTimeout`] / [`ConvertError::NavigationError`]
///   if the content or its fonts do not settle
/// - [`ConvertError::MeasurementError`] if the body or its box is missing
pub fn measure_content_height(
    manager: &dyn BrowserSessionManager,
    html: &str,
    width_px: u32,
) -> Result<MeasuredHeight> {
    let start = Instant::now();
    let page = ProbePage::acquire(manager)?;
    log::debug!("Measuring content at {}px wide (probe page {})", width_px, page.id());

    page.set_viewport(width_px, PROBE_VIEWPORT_HEIGHT).map_err(|e| {
        ConvertError::MeasurementError(format!("could not size probe viewport: {}", e))
    })?;
    set_content(page.driver(), html, INLINE_CONTENT_TIMEOUT)?;
    wait_for_fonts(page.driver(), FONT_READY_TIMEOUT)?;

    let height = read_body_height(page.driver())?;
    log::debug!(
        "Measured {}px at {}px wide in {:?}",
        height.pixels(),
        width_px,
        start.elapsed()
    );

    Ok(height)
}

/// Read the body's bounding box height from an already-loaded page.
///
/// # Errors
///
/// Returns [`ConvertError::MeasurementError`] if the page has no body, the
/// box is unavailable, or the evaluation fails.
pub fn read_body_height(page: &dyn PageDriver) -> Result<MeasuredHeight> {
    let value = page
        .evaluate(BODY_HEIGHT_JS)
        .map_err(|e| ConvertError::MeasurementError(format!("could not read body box: {}", e)))?;

    let height = value.as_ref().and_then(|v| v.as_f64()).ok_or_else(|| {
        ConvertError::MeasurementError("document has no body bounding box".to_string())
    })?;

    MeasuredHeight::from_layout_height(height)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::DriverError;
    use crate::driver::mock::{MockPage, MockScript, MockSessionManager, PageCall};
    use crate::loader::BLANK_PAGE_URL;

    /// Verifies layout heights round up.
    #[test]
    fn test_from_layout_height_ceils() {
        assert_eq!(MeasuredHeight::from_layout_height(100.2).unwrap().pixels(), 101);
        assert_eq!(MeasuredHeight::from_layout_height(100.0).unwrap().pixels(), 100);
        assert_eq!(MeasuredHeight::from_layout_height(0.0).unwrap().pixels(), 0);
    }

    /// Verifies unusable heights are measurement errors.
    #[test]
    fn test_from_layout_height_rejects() {
        for height in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                MeasuredHeight::from_layout_height(height),
                Err(ConvertError::MeasurementError(_))
            ));
        }
    }

    /// Verifies the probe sizes its own page, loads content, and reads the body.
    #[test]
    fn test_measure_content_height() {
        let manager = MockSessionManager::new(MockScript {
            body_height: Some(512.3),
            ..MockScript::default()
        });

        let height = measure_content_height(&manager, "<p>hello</p>", 794).unwrap();

        assert_eq!(height.pixels(), 513);
        let pages = manager.page_calls();
        assert_eq!(pages.len(), 1);
        assert_eq!(
            pages[0][0],
            PageCall::SetViewport {
                width: 794,
                height: PROBE_VIEWPORT_HEIGHT
            }
        );
        assert_eq!(pages[0][1], PageCall::Navigate(BLANK_PAGE_URL.to_string()));
        assert_eq!(
            pages[0][2],
            PageCall::SetDocumentContent("<p>hello</p>".to_string())
        );
        assert_eq!(pages[0].last(), Some(&PageCall::Close));
        assert!(manager.stats().is_idle());
    }

    /// Verifies repeated probes of the same input agree.
    #[test]
    fn test_measure_is_stable() {
        let manager = MockSessionManager::new(MockScript {
            body_height: Some(777.5),
            ..MockScript::default()
        });

        let first = measure_content_height(&manager, "<h1>x</h1>", 400).unwrap();
        let second = measure_content_height(&manager, "<h1>x</h1>", 400).unwrap();
        assert!(first.pixels().abs_diff(second.pixels()) <= 1);
    }

    /// Verifies a missing body fails instead of guessing a height.
    #[test]
    fn test_missing_body_is_measurement_error() {
        let manager = MockSessionManager::new(MockScript {
            body_height: None,
            ..MockScript::default()
        });

        let err = measure_content_height(&manager, "<p>x</p>", 300).unwrap_err();
        assert!(matches!(err, ConvertError::MeasurementError(_)));
        assert!(manager.stats().is_idle(), "probe page must be released");
    }

    /// Verifies evaluation failures map to MeasurementError.
    #[test]
    fn test_read_body_height_eval_error() {
        let page = MockPage::new(MockScript {
            evaluate_error: Some(DriverError::Failed("context destroyed".to_string())),
            ..MockScript::default()
        });

        assert!(matches!(
            read_body_height(&page),
            Err(ConvertError::MeasurementError(_))
        ));
    }

    /// Verifies probe acquisition failures surface as EngineUnavailable.
    #[test]
    fn test_probe_engine_unavailable() {
        let manager = MockSessionManager::default().unavailable("no chrome");

        let err = measure_content_height(&manager, "<p>x</p>", 300).unwrap_err();
        assert!(matches!(err, ConvertError::EngineUnavailable(_)));
        assert_eq!(manager.stats().pages_opened, 0);
    }
}
