//! Framework-agnostic conversion service.
//!
//! Holds the request/response types and the blocking conversion functions
//! that HTTP handlers call. Handlers stay thin: they parse the body, hand a
//! [`ConversionRequest`] to [`generate_pdf`] on a blocking thread, and map
//! the outcome to a response.
//!
//! ```text
//! ┌─────────────────────────┐  ┌─────────────────────────────┐
//! │       types.rs          │  │           pdf.rs            │
//! │  PdfFromHtmlRequest     │  │  generate_pdf_from_url()    │
//! │  PdfFromUrlRequest      │  │  generate_pdf_from_html()   │
//! │  HtmlDocumentRequest    │  │  wrap_html_document()       │
//! │  ConversionRequest      │  │  get_session_stats()        │
//! │  PdfResponse            │  │  test_document_request()    │
//! │  ErrorResponse          │  └─────────────────────────────┘
//! │  HealthResponse         │  ┌─────────────────────────────┐
//! │  StatsResponse          │  │        markdown.rs          │
//! │  MarkdownRequest        │  │  strip_front_matter()       │
//! └─────────────────────────┘  │  render_markdown()          │
//!                              │  markdown_to_html()         │
//!                              └─────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use html2pdf_render::service::{ConversionRequest, generate_pdf};
//!
//! let request = ConversionRequest::url("Example", "https://example.com");
//! let pdf = generate_pdf(manager.as_ref(), &request)?;
//! std::fs::write(&pdf.filename, &pdf.data)?;
//! ```

mod markdown;
mod pdf;
mod types;

pub use types::ContentSource;
pub use types::ConversionRequest;
pub use types::DEFAULT_TITLE;
pub use types::ErrorResponse;
pub use types::HealthResponse;
pub use types::HtmlDocumentRequest;
pub use types::MarkdownRequest;
pub use types::PdfFromHtmlRequest;
pub use types::PdfFromUrlRequest;
pub use types::PdfResponse;
pub use types::StatsResponse;

pub use markdown::markdown_to_html;
pub use markdown::render_markdown;
pub use markdown::strip_front_matter;

pub use pdf::TEST_DOCUMENT_TITLE;
pub use pdf::generate_pdf;
pub use pdf::generate_pdf_from_html;
pub use pdf::generate_pdf_from_url;
pub use pdf::get_session_stats;
pub use pdf::test_document_request;
pub use pdf::wrap_html_document;
