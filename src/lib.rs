//! # html2pdf-render
//!
//! HTML and URL to PDF conversion driving headless Chrome.
//!
//! Besides the usual named paper formats, pages can be sized explicitly in
//! millimetres, or given a fixed width with the height measured from the
//! rendered content, so a whole document prints as one continuous page.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │        HTTP handlers (integrations::axum)   │
//! └─────────────────┬───────────────────────────┘
//!                   │ ConversionRequest
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │                 service                     │
//! │  loader ──► probe ──► sizing ──► print      │
//! └─────────────────┬───────────────────────────┘
//!                   │ acquire_page()
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │          BrowserSessionManager              │
//! │   PerRequestLifecycle | SharedInstance      │
//! │   PageSession closes its page on drop       │
//! └─────────────────┬───────────────────────────┘
//!                   │ PageDriver
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │        Headless Chrome (headless_chrome)    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Page Sizing
//!
//! | Request fields | Policy | Paper |
//! |----------------|--------|-------|
//! | `size` | [`SizePolicy::Standard`] | named format |
//! | `width` + `height` | [`SizePolicy::Explicit`] | `<w>mm` x `<h>mm` |
//! | `width` only | [`SizePolicy::WidthOnly`] | `<w>mm` x measured height |
//! | none | [`SizePolicy::Standard`] | A4 |
//!
//! Width-only HTML is measured on a separate probe page that is closed
//! before the export page prints.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use html2pdf_render::prelude::*;
//! use html2pdf_render::service::{ConversionRequest, generate_pdf};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServiceConfigBuilder::new()
//!         .strategy(LifecycleStrategy::SharedInstance)
//!         .build()?;
//!     let manager = init_session_manager(&config).await?;
//!
//!     let request = ConversionRequest::html("Receipt", "<h1>Total: 42</h1>")
//!         .with_size_policy(SizePolicy::WidthOnly {
//!             width: Dimension::parse("80")?,
//!         });
//!
//!     let pdf = tokio::task::spawn_blocking(move || generate_pdf(manager.as_ref(), &request))
//!         .await??;
//!     std::fs::write(&pdf.filename, &pdf.data)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Configuration
//!
//! With the `env-config` feature (on by default) configuration is read from
//! the environment and an optional `app.env` file:
//!
//! | Variable | Type | Default | Description |
//! |----------|------|---------|-------------|
//! | `HTML2PDF_LIFECYCLE` | `per-request` / `shared` | `shared` | Browser lifecycle |
//! | `BROWSER_TTL_SECONDS` | u64 | 3600 | Shared browser lifetime |
//! | `BROWSER_WARMUP_TIMEOUT_SECONDS` | u64 | 60 | Startup launch bound |
//! | `PDF_OPERATION_TIMEOUT_SECONDS` | u64 | 120 | Whole-conversion bound |
//! | `CHROME_PATH` | String | auto | Custom Chrome binary |
//! | `BIND_ADDRESS` | String | `0.0.0.0:3000` | HTTP listen address |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `env-config` | Environment-based configuration |
//! | `axum-integration` | Axum router and handlers |
//! | `server` | The `html2pdf-server` binary |
//! | `test-utils` | Scripted mock pages, managers and factories |
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`Result<T, ConvertError>`](Result).
//! Each error kind carries its HTTP status:
//!
//! ```rust
//! use html2pdf_render::ConvertError;
//!
//! let error = ConvertError::EngineUnavailable("chrome exited".into());
//! assert_eq!(error.status_code(), 503);
//! assert_eq!(error.error_code(), "ENGINE_UNAVAILABLE");
//! ```
//!
//! ## Testing
//!
//! With `test-utils`, [`MockSessionManager`](driver::mock::MockSessionManager)
//! serves scripted pages and records every call made on them:
//!
//! ```rust,ignore
//! use html2pdf_render::driver::mock::{MockScript, MockSessionManager};
//!
//! let manager = MockSessionManager::new(MockScript {
//!     body_height: Some(377.9),
//!     ..MockScript::default()
//! });
//! ```

#![doc(html_root_url = "https://docs.rs/html2pdf-render/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod driver;
pub mod error;
pub mod factory;
pub mod lifecycle;
pub mod loader;
pub mod prelude;
pub mod probe;
pub mod service;
pub mod session;
pub mod sizing;
pub mod stats;
pub mod traits;
pub mod units;

// Internal modules (not publicly exposed)
pub(crate) mod tracked;

// ============================================================================
// Feature-gated modules
// ============================================================================

#[cfg(feature = "axum-integration")]
pub mod integrations;

// ============================================================================
// Re-exports (Public API)
// ============================================================================

pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use driver::{ChromePage, DriverError, PageDriver};
pub use error::{ConvertError, Result};
pub use factory::{BrowserFactory, ChromeBrowserFactory, create_chrome_options};
pub use lifecycle::{
    BrowserSessionManager, LifecycleStrategy, PerRequestLifecycle, SharedInstanceLifecycle,
    SharedSessionManager, build_session_manager, init_session_manager, warmup_session_manager,
};
pub use loader::{MediaType, WaitUntil};
pub use probe::{MeasuredHeight, measure_content_height};
pub use session::{ExportPage, PageSession, ProbePage};
pub use sizing::{
    Dimension, Margin, PaperFormat, PaperSize, PdfExportOptions, SizePolicy,
    resolve_export_options,
};
pub use stats::{SessionCounters, SessionStats};
pub use traits::Healthcheck;

#[cfg(feature = "env-config")]
pub use config::env::from_env;
