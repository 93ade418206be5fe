//! Headless Chrome page driver.
//!
//! [`ChromePage`] drives one `headless_chrome` tab over the DevTools
//! protocol. It keeps a reference to the owning [`Browser`] so the process
//! outlives the tab even if the session manager retires that browser while
//! the page is still in use.
//!
//! Everything here is scoped to the tab's own DevTools target. Tabs of one
//! headless browser share a window, so window-level calls such as
//! `Browser.setWindowBounds` would resize every page at once; the viewport
//! is set with `Emulation.setDeviceMetricsOverride` instead.

use std::sync::Arc;
use std::time::Duration;

use headless_chrome::protocol::cdp::{Emulation, Page};
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, Tab};

use super::{DriverError, DriverResult, PageDriver};
use crate::loader::MediaType;
use crate::sizing::{PaperSize, PdfExportOptions};
use crate::units::millimeters_to_inches;

/// A headless Chrome tab.
///
/// Field order matters: the tab is dropped before the browser handle.
pub struct ChromePage {
    tab: Arc<Tab>,
    _browser: Arc<Browser>,
}

impl ChromePage {
    /// Wrap a tab together with the browser that owns it.
    pub fn new(tab: Arc<Tab>, browser: Arc<Browser>) -> Self {
        Self {
            tab,
            _browser: browser,
        }
    }
}

impl PageDriver for ChromePage {
    fn set_viewport(&self, width: u32, height: u32) -> DriverResult<()> {
        log::trace!("Overriding device metrics to {}x{}", width, height);
        self.tab
            .call_method(device_metrics(width, height))
            .map(|_| ())
            .map_err(|e| DriverError::Failed(e.to_string()))
    }

    fn emulate_media(&self, media: MediaType) -> DriverResult<()> {
        log::trace!("Emulating media '{}'", media.as_str());
        self.tab
            .call_method(Emulation::SetEmulatedMedia {
                media: Some(media.as_str().to_string()),
                features: None,
            })
            .map(|_| ())
            .map_err(|e| DriverError::Failed(e.to_string()))
    }

    fn navigate(&self, url: &str, timeout: Duration) -> DriverResult<()> {
        self.tab.set_default_timeout(timeout);

        self.tab.navigate_to(url).map_err(|e| {
            log::error!("❌ Navigation failed: {}", e);
            DriverError::Failed(e.to_string())
        })?;

        self.tab.wait_until_navigated().map_err(|e| {
            log::error!("❌ Navigation did not complete within {:?}: {}", timeout, e);
            DriverError::Timeout(e.to_string())
        })?;

        Ok(())
    }

    fn set_document_content(&self, html: &str) -> DriverResult<()> {
        let tree = self
            .tab
            .call_method(Page::GetFrameTree(None))
            .map_err(|e| DriverError::Failed(format!("could not read frame tree: {}", e)))?;

        self.tab
            .call_method(Page::SetDocumentContent {
                frame_id: tree.frame_tree.frame.id,
                html: html.to_string(),
            })
            .map(|_| ())
            .map_err(|e| {
                log::error!("❌ Failed to set document content: {}", e);
                DriverError::Failed(e.to_string())
            })
    }

    fn evaluate(&self, expression: &str) -> DriverResult<Option<serde_json::Value>> {
        self.tab
            .evaluate(expression, false)
            .map(|remote| remote.value)
            .map_err(|e| DriverError::Failed(e.to_string()))
    }

    fn print_to_pdf(&self, options: &PdfExportOptions) -> DriverResult<Vec<u8>> {
        self.tab
            .print_to_pdf(Some(build_print_options(options)))
            .map_err(|e| {
                log::error!("❌ Failed to generate PDF: {}", e);
                DriverError::Failed(e.to_string())
            })
    }

    fn close(&self) -> DriverResult<()> {
        self.tab
            .close(true)
            .map(|_| ())
            .map_err(|e| DriverError::Failed(e.to_string()))
    }
}

/// Per-target viewport override at 1x scale.
fn device_metrics(width: u32, height: u32) -> Emulation::SetDeviceMetricsOverride {
    Emulation::SetDeviceMetricsOverride {
        width,
        height,
        device_scale_factor: 1.0,
        mobile: false,
        scale: None,
        screen_width: None,
        screen_height: None,
        position_x: None,
        position_y: None,
        dont_set_visible_size: None,
        screen_orientation: None,
        viewport: None,
        display_feature: None,
        device_posture: None,
    }
}

/// Translate resolved options into the DevTools print call.
///
/// DevTools takes paper size and margins in inches; this is the only place
/// millimeters are converted.
fn build_print_options(options: &PdfExportOptions) -> PrintToPdfOptions {
    let (width_mm, height_mm) = options.paper.dimensions_mm();
    let margin = &options.margin;

    if let PaperSize::Format(format) = options.paper {
        log::trace!("Printing with standard format {}", format);
    }

    PrintToPdfOptions {
        landscape: Some(false),
        display_header_footer: Some(false),
        print_background: Some(options.print_background),
        paper_width: Some(millimeters_to_inches(width_mm)),
        paper_height: Some(millimeters_to_inches(height_mm)),
        margin_top: Some(millimeters_to_inches(margin.top)),
        margin_bottom: Some(millimeters_to_inches(margin.bottom)),
        margin_left: Some(millimeters_to_inches(margin.left)),
        margin_right: Some(millimeters_to_inches(margin.right)),
        prefer_css_page_size: Some(false),
        ..Default::default()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
