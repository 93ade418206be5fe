//! Request and response types for the conversion service.
//!
//! Wire DTOs ([`PdfFromHtmlRequest`], [`PdfFromUrlRequest`],
//! [`HtmlDocumentRequest`], [`MarkdownRequest`]) are deserialized straight
//! from JSON bodies and converted into the typed [`ConversionRequest`] the
//! orchestrator runs.
//! Conversion is where loose input (blank strings, `"100mm"` vs `100`,
//! millisecond timeouts) becomes typed values or an
//! [`InvalidRequest`](ConvertError::InvalidRequest).
//!
//! # Request Body Examples
//!
//! ```text
//! POST /html-to-pdf
//! {
//!     "title": "Invoice 42",
//!     "html": "<h1>Invoice</h1>...",
//!     "width": "80",
//!     "margin": { "top": 5, "bottom": 5 }
//! }
//!
//! POST /url-to-pdf
//! {
//!     "title": "Example",
//!     "url": "https://example.com",
//!     "size": "A4",
//!     "waitUntil": "load",
//!     "timeout": 15000,
//!     "emulateMedia": "print"
//! }
//! ```

use std::time::Duration;

use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ConvertError, Result};
use crate::loader::{DEFAULT_NAVIGATION_TIMEOUT, MediaType, WaitUntil};
use crate::sizing::{Margin, PaperFormat, SizePolicy};
use crate::stats::SessionStats;

/// Title used when a request's title is blank.
pub const DEFAULT_TITLE: &str = "document";

// ============================================================================
// Core request
// ============================================================================

/// Where the document comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentSource {
    /// Inline HTML.
    Html(String),
    /// A URL to load.
    Url(String),
}

/// A fully typed conversion request.
///
/// # Example
///
/// ```rust
/// use html2pdf_render::service::ConversionRequest;
/// use html2pdf_render::{PaperFormat, SizePolicy};
///
/// let request = ConversionRequest::html("Report", "<h1>Hi</h1>")
///     .with_size_policy(SizePolicy::Standard(PaperFormat::Letter));
///
/// assert_eq!(request.filename(), "Report.pdf");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    /// Used only to name the output.
    pub title: String,
    /// The document.
    pub source: ContentSource,
    /// How the page is sized.
    pub size_policy: SizePolicy,
    /// Page margins in millimeters.
    pub margin: Margin,
    /// Load condition for URL sources. Inline HTML always waits for network idle.
    pub wait_until: WaitUntil,
    /// Navigation bound for URL sources.
    pub timeout: Duration,
    /// Media emulation for URL sources.
    pub emulate_media: MediaType,
}

impl ConversionRequest {
    fn new(title: &str, source: ContentSource) -> Self {
        Self {
            title: title.to_string(),
            source,
            size_policy: SizePolicy::default(),
            margin: Margin::default(),
            wait_until: WaitUntil::default(),
            timeout: DEFAULT_NAVIGATION_TIMEOUT,
            emulate_media: MediaType::default(),
        }
    }

    /// Inline HTML request with default sizing (A4, no margins).
    pub fn html(title: &str, html: &str) -> Self {
        Self::new(title, ContentSource::Html(html.to_string()))
    }

    /// URL request with default sizing and load settings.
    pub fn url(title: &str, url: &str) -> Self {
        Self::new(title, ContentSource::Url(url.to_string()))
    }

    /// Replace the size policy.
    pub fn with_size_policy(mut self, policy: SizePolicy) -> Self {
        self.size_policy = policy;
        self
    }

    /// Replace the margins.
    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = margin;
        self
    }

    /// Output filename: the title (or `document`) plus `.pdf`.
    pub fn filename(&self) -> String {
        let title = self.title.trim();
        let title = if title.is_empty() { DEFAULT_TITLE } else { title };
        format!("{}.pdf", title)
    }
}

// ============================================================================
// Wire DTOs
// ============================================================================

/// Body of `POST /html-to-pdf`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PdfFromHtmlRequest {
    /// Output name.
    #[serde(default)]
    pub title: String,

    /// HTML to render; must not be blank.
    #[serde(default)]
    pub html: String,

    /// Standard paper format; wins over `width`/`height`.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub size: Option<PaperFormat>,

    /// Page width in mm (`"80"`, `"80mm"` or `80`).
    #[serde(default, deserialize_with = "dimension_field")]
    pub width: Option<String>,

    /// Page height in mm; without `width` it is ignored.
    #[serde(default, deserialize_with = "dimension_field")]
    pub height: Option<String>,

    /// Margins in mm.
    #[serde(default)]
    pub margin: Option<Margin>,
}

impl TryFrom<PdfFromHtmlRequest> for ConversionRequest {
    type Error = ConvertError;

    fn try_from(dto: PdfFromHtmlRequest) -> Result<Self> {
        let size_policy =
            SizePolicy::from_request_fields(dto.size, dto.width.as_deref(), dto.height.as_deref())?;

        Ok(ConversionRequest::html(&dto.title, &dto.html)
            .with_size_policy(size_policy)
            .with_margin(dto.margin.unwrap_or_default()))
    }
}

/// Body of `POST /url-to-pdf`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfFromUrlRequest {
    /// Output name.
    #[serde(default)]
    pub title: String,

    /// Absolute URL to load.
    #[serde(default)]
    pub url: String,

    /// Standard paper format; wins over `width`/`height`.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub size: Option<PaperFormat>,

    /// Page width in mm.
    #[serde(default, deserialize_with = "dimension_field")]
    pub width: Option<String>,

    /// Page height in mm.
    #[serde(default, deserialize_with = "dimension_field")]
    pub height: Option<String>,

    /// Margins in mm.
    #[serde(default)]
    pub margin: Option<Margin>,

    /// `load`, `domcontentloaded` or `networkidle` (default).
    #[serde(default, deserialize_with = "blank_as_none")]
    pub wait_until: Option<WaitUntil>,

    /// Navigation timeout in milliseconds (default 30000).
    #[serde(default)]
    pub timeout: Option<u64>,

    /// `screen` (default) or `print`.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub emulate_media: Option<MediaType>,
}

impl TryFrom<PdfFromUrlRequest> for ConversionRequest {
    type Error = ConvertError;

    fn try_from(dto: PdfFromUrlRequest) -> Result<Self> {
        let size_policy =
            SizePolicy::from_request_fields(dto.size, dto.width.as_deref(), dto.height.as_deref())?;

        let timeout = match dto.timeout {
            Some(0) => {
                return Err(ConvertError::InvalidRequest(
                    "timeout must be greater than 0".to_string(),
                ));
            }
            Some(ms) => Duration::from_millis(ms),
            None => DEFAULT_NAVIGATION_TIMEOUT,
        };

        let mut request = ConversionRequest::url(&dto.title, dto.url.trim())
            .with_size_policy(size_policy)
            .with_margin(dto.margin.unwrap_or_default());
        request.wait_until = dto.wait_until.unwrap_or_default();
        request.timeout = timeout;
        request.emulate_media = dto.emulate_media.unwrap_or_default();
        Ok(request)
    }
}

/// Body of `POST /html-to-html`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HtmlDocumentRequest {
    /// Document title.
    #[serde(default)]
    pub title: String,
    /// Body markup.
    #[serde(default)]
    pub content: String,
    /// Optional stylesheet.
    #[serde(default)]
    pub css: Option<String>,
}

/// Body of `POST /markdown-to-html` and `POST /markdown-to-pdf`.
///
/// `content` may open with a `---` front-matter block; it is dropped before
/// rendering. The sizing fields only matter for PDF output.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MarkdownRequest {
    /// Document title and output name.
    #[serde(default)]
    pub title: String,

    /// Markdown source.
    #[serde(default)]
    pub content: String,

    /// Optional stylesheet.
    #[serde(default)]
    pub css: Option<String>,

    /// Standard paper format; wins over `width`/`height`.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub size: Option<PaperFormat>,

    /// Page width in mm.
    #[serde(default, deserialize_with = "dimension_field")]
    pub width: Option<String>,

    /// Page height in mm.
    #[serde(default, deserialize_with = "dimension_field")]
    pub height: Option<String>,

    /// Margins in mm.
    #[serde(default)]
    pub margin: Option<Margin>,
}

/// Deserialize an optional value where `""` and `null` mean absent.
fn blank_as_none<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.trim().is_empty() => {
            T::deserialize(s.trim().into_deserializer()).map(Some)
        }
        _ => Ok(None),
    }
}

/// Accept a dimension as either a JSON string or a JSON number.
fn dimension_field<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => Some(s),
        Some(Raw::Number(n)) => Some(n.to_string()),
        None => None,
    })
}

// ============================================================================
// Responses
// ============================================================================

/// A finished PDF.
#[derive(Debug, Clone)]
pub struct PdfResponse {
    /// Complete PDF bytes.
    pub data: Vec<u8>,
    /// Suggested filename, including `.pdf`.
    pub filename: String,
}

impl PdfResponse {
    /// Wrap generated bytes.
    pub fn new(data: Vec<u8>, filename: String) -> Self {
        Self { data, filename }
    }

    /// `Content-Disposition` value for inline display.
    ///
    /// The filename is percent-encoded in both the plain and the RFC 5987
    /// parameter.
    ///
    /// ```rust
    /// use html2pdf_render::service::PdfResponse;
    ///
    /// let response = PdfResponse::new(vec![], "My Report.pdf".to_string());
    /// assert_eq!(
    ///     response.content_disposition(),
    ///     "inline; filename=\"My%20Report.pdf\"; filename*=UTF-8''My%20Report.pdf"
    /// );
    /// ```
    pub fn content_disposition(&self) -> String {
        let encoded = urlencoding::encode(&self.filename);
        format!(
            "inline; filename=\"{}\"; filename*=UTF-8''{}",
            encoded, encoded
        )
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// `GET /health` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"healthy"` when the endpoint answers.
    pub status: String,
    /// Service identifier.
    pub service: String,
    /// Active lifecycle name.
    pub lifecycle: String,
}

impl HealthResponse {
    /// Healthy response for a lifecycle.
    pub fn new(lifecycle: &str) -> Self {
        Self {
            status: "healthy".to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
            lifecycle: lifecycle.to_string(),
        }
    }
}

/// `GET /stats` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Active lifecycle name.
    pub lifecycle: String,
    /// Pages handed out since startup.
    pub pages_opened: u64,
    /// Pages released since startup.
    pub pages_closed: u64,
    /// Pages currently open.
    pub open_pages: u64,
    /// Browser processes started since startup.
    pub browsers_launched: u64,
}

impl StatsResponse {
    /// Build from a lifecycle name and a counter snapshot.
    pub fn new(lifecycle: &str, stats: SessionStats) -> Self {
        Self {
            lifecycle: lifecycle.to_string(),
            pages_opened: stats.pages_opened,
            pages_closed: stats.pages_closed,
            open_pages: stats.open_pages(),
            browsers_launched: stats.browsers_launched,
        }
    }
}

/// JSON error body.
///
/// ```text
/// { "error": "Invalid request: html must not be empty", "code": "INVALID_REQUEST" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
    /// Stable machine-readable code; see [`ConvertError::error_code`].
    pub code: String,
}

impl From<&ConvertError> for ErrorResponse {
    fn from(err: &ConvertError) -> Self {
        Self {
            error: err.to_string(),
            code: err.error_code().to_string(),
        }
    }
}

impl From<ConvertError> for ErrorResponse {
    fn from(err: ConvertError) -> Self {
        Self::from(&err)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
