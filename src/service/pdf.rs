//! Core PDF generation.
//!
//! The two entry points run a conversion as a strict sequence of blocking
//! engine calls. They are framework-agnostic; HTTP handlers call them from
//! `spawn_blocking` under an operation timeout.
//!
//! # From a URL
//!
//! ```text
//! validate URL ─→ ExportPage ─→ emulate media ─→ load_url ─→ fonts
//!     ─→ resolve size (WidthOnly: read this page's body) ─→ print
//! ```
//!
//! # From inline HTML
//!
//! ```text
//! check HTML ─→ ExportPage ─→ resolve size (WidthOnly: ProbePage)
//!     ─→ set_content ─→ fonts ─→ print
//! ```
//!
//! Every page is released when its guard drops, on success and on every
//! error. Nothing is retried.

use std::time::Instant;

use url::Url;

use super::types::{
    ContentSource, ConversionRequest, HtmlDocumentRequest, PdfResponse, StatsResponse,
};
use crate::error::{ConvertError, Result};
use crate::lifecycle::BrowserSessionManager;
use crate::loader::{
    FONT_READY_TIMEOUT, INLINE_CONTENT_TIMEOUT, load_url, set_content, wait_for_fonts,
};
use crate::probe::{measure_content_height, read_body_height};
use crate::session::ExportPage;
use crate::sizing::{PaperFormat, PdfExportOptions, SizePolicy, resolve_export_options};

/// Title of the built-in sample document served at `GET /pdf/test`.
pub const TEST_DOCUMENT_TITLE: &str = "Test PDF";

/// Convert a request, dispatching on its source.
pub fn generate_pdf(
    manager: &dyn BrowserSessionManager,
    request: &ConversionRequest,
) -> Result<PdfResponse> {
    match &request.source {
        ContentSource::Html(_) => generate_pdf_from_html(manager, request),
        ContentSource::Url(_) => generate_pdf_from_url(manager, request),
    }
}

/// Load a URL and print it.
///
/// For [`SizePolicy::WidthOnly`] the height is read from the already-loaded
/// page; no probe page is opened.
///
/// # Errors
///
/// - [`ConvertError::InvalidRequest`] if the source is not a parseable URL
/// - [`ConvertError::EngineUnavailable`] if no page can be opened
/// - [`ConvertError::NavigationError`] / [`ConvertError::NavigationTimeout`]
///   if the page does not load
/// - [`ConvertError::MeasurementError`] if a width-only page has no body box
/// - [`ConvertError::ExportError`] if printing fails
pub fn generate_pdf_from_url(
    manager: &dyn BrowserSessionManager,
    request: &ConversionRequest,
) -> Result<PdfResponse> {
    let ContentSource::Url(raw) = &request.source else {
        return Err(ConvertError::InvalidRequest(
            "expected a URL source".to_string(),
        ));
    };
    let url = validate_url(raw)?;

    let start = Instant::now();
    log::info!(
        "📄 Converting URL {} ({:?}, wait_until={})",
        url,
        request.size_policy,
        request.wait_until
    );

    let page = ExportPage::acquire(manager)?;

    page.emulate_media(request.emulate_media).map_err(|e| {
        ConvertError::NavigationError(format!(
            "could not emulate '{}' media: {}",
            request.emulate_media.as_str(),
            e
        ))
    })?;
    load_url(page.driver(), url.as_str(), request.wait_until, request.timeout)?;
    wait_for_fonts(page.driver(), FONT_READY_TIMEOUT)?;

    let options = resolve_export_options(&request.size_policy, request.margin, |_| {
        read_body_height(page.driver())
    })?;

    let data = print(&page, &options)?;
    log::info!(
        "✅ Generated {} bytes from URL in {:?}",
        data.len(),
        start.elapsed()
    );

    Ok(PdfResponse::new(data, request.filename()))
}

/// Render inline HTML and print it.
///
/// For [`SizePolicy::WidthOnly`] the height is measured first, in a separate
/// probe page, before the content is loaded into the export page.
///
/// # Errors
///
/// - [`ConvertError::InvalidRequest`] if the HTML is blank
/// - [`ConvertError::EngineUnavailable`] if a page cannot be opened
/// - [`ConvertError::NavigationTimeout`] if the content or fonts do not settle
/// - [`ConvertError::MeasurementError`] if the probe cannot read the body box
/// - [`ConvertError::ExportError`] if printing fails
pub fn generate_pdf_from_html(
    manager: &dyn BrowserSessionManager,
    request: &ConversionRequest,
) -> Result<PdfResponse> {
    let ContentSource::Html(html) = &request.source else {
        return Err(ConvertError::InvalidRequest(
            "expected an HTML source".to_string(),
        ));
    };
    if html.trim().is_empty() {
        return Err(ConvertError::InvalidRequest(
            "html must not be empty".to_string(),
        ));
    }

    let start = Instant::now();
    log::info!(
        "📄 Converting {} bytes of HTML ({:?})",
        html.len(),
        request.size_policy
    );

    let page = ExportPage::acquire(manager)?;
    if request.size_policy.needs_measurement() {
        log::debug!("Measuring content height before loading page {}", page.id());
    }

    let options = resolve_export_options(&request.size_policy, request.margin, |width_px| {
        measure_content_height(manager, html, width_px)
    })?;

    set_content(page.driver(), html, INLINE_CONTENT_TIMEOUT)?;
    wait_for_fonts(page.driver(), FONT_READY_TIMEOUT)?;

    let data = print(&page, &options)?;
    log::info!(
        "✅ Generated {} bytes from HTML in {:?}",
        data.len(),
        start.elapsed()
    );

    Ok(PdfResponse::new(data, request.filename()))
}

fn print(page: &ExportPage, options: &PdfExportOptions) -> Result<Vec<u8>> {
    options.validate()?;

    let data = page
        .print_to_pdf(options)
        .map_err(|e| ConvertError::ExportError(e.to_string()))?;

    if data.is_empty() {
        return Err(ConvertError::ExportError(
            "engine returned an empty document".to_string(),
        ));
    }
    Ok(data)
}

fn validate_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConvertError::InvalidRequest(format!("invalid url '{}': {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" | "data" => Ok(url),
        other => Err(ConvertError::InvalidRequest(format!(
            "unsupported url scheme '{}'",
            other
        ))),
    }
}

/// Current counters of `manager`.
pub fn get_session_stats(manager: &dyn BrowserSessionManager) -> StatsResponse {
    StatsResponse::new(manager.name(), manager.stats())
}

/// Wrap a title, body and optional stylesheet into a complete HTML
/// document.
///
/// The title is escaped; `content` and `css` are inserted as-is.
pub fn wrap_html_document(request: &HtmlDocumentRequest) -> String {
    let title = request.title.trim();
    let title = if title.is_empty() { "Document" } else { title };

    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"es\">\n\
         <head>\n\
         <meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{}</title>\n\
         <style>\n{}\n</style>\n\
         </head>\n\
         <body>\n{}\n</body>\n\
         </html>\n",
        escape_html(title),
        request.css.as_deref().unwrap_or_default(),
        request.content
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// The sample document rendered by `GET /pdf/test`, on A4.
pub fn test_document_request() -> ConversionRequest {
    let html = wrap_html_document(&HtmlDocumentRequest {
        title: TEST_DOCUMENT_TITLE.to_string(),
        content: "<h1>Test PDF</h1>\n\
                  <p>If you can read this, HTML to PDF conversion is working.</p>\n\
                  <table>\n\
                  <tr><th>Check</th><th>Status</th></tr>\n\
                  <tr><td>Browser</td><td>OK</td></tr>\n\
                  <tr><td>Fonts</td><td>OK</td></tr>\n\
                  <tr><td>Backgrounds</td><td class=\"ok\">OK</td></tr>\n\
                  </table>"
            .to_string(),
        css: Some(
            "body { font-family: sans-serif; margin: 2rem; }\n\
             table { border-collapse: collapse; }\n\
             th, td { border: 1px solid #999; padding: 4px 12px; }\n\
             .ok { background: #c8f7c5; }"
                .to_string(),
        ),
    });

    ConversionRequest::html(TEST_DOCUMENT_TITLE, &html)
        .with_size_policy(SizePolicy::Standard(PaperFormat::A4))
}

// ============================================================================
// Unit Tests
// ============================================================================
