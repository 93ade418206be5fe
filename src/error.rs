//! Error types for PDF conversion.
//!
//! This module provides [`ConvertError`], the single error type returned by
//! every conversion step, and a convenient [`Result`] type alias.
//!
//! Errors are never retried inside the crate. Each variant carries the
//! underlying message unchanged so the HTTP layer can surface it verbatim.
//!
//! # Example
//!
//! ```rust
//! use html2pdf_render::{ConvertError, Result};
//!
//! fn render() -> Result<Vec<u8>> {
//!     Err(ConvertError::EngineUnavailable("chrome not found".to_string()))
//! }
//!
//! match render() {
//!     Ok(pdf) => println!("Generated {} bytes", pdf.len()),
//!     Err(e) if e.status_code() == 503 => println!("Engine down: {}", e),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

/// Errors that can occur while converting content to PDF.
///
/// # HTTP Mapping
///
/// | Variant | Status | Code |
/// |---------|--------|------|
/// | [`InvalidRequest`](Self::InvalidRequest) | 400 | `INVALID_REQUEST` |
/// | [`EngineUnavailable`](Self::EngineUnavailable) | 503 | `ENGINE_UNAVAILABLE` |
/// | [`NavigationError`](Self::NavigationError) | 502 | `NAVIGATION_ERROR` |
/// | [`NavigationTimeout`](Self::NavigationTimeout) | 504 | `NAVIGATION_TIMEOUT` |
/// | [`MeasurementError`](Self::MeasurementError) | 500 | `MEASUREMENT_ERROR` |
/// | [`ExportError`](Self::ExportError) | 500 | `EXPORT_ERROR` |
/// | [`Timeout`](Self::Timeout) | 504 | `TIMEOUT` |
/// | [`Configuration`](Self::Configuration) | 500 | `CONFIGURATION_ERROR` |
/// | [`Internal`](Self::Internal) | 500 | `INTERNAL_ERROR` |
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvertError {
    /// The request cannot be converted as given.
    ///
    /// Raised for an empty HTML body, a URL that does not parse, or a
    /// width/height that is not a number of millimeters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The browser process could not be started or a page could not be opened.
    ///
    /// # Common Causes
    ///
    /// - Chrome/Chromium binary not found
    /// - Browser crashed or was killed
    /// - Session manager is shutting down
    /// - Resource exhaustion (too many processes or tabs)
    #[error("Rendering engine unavailable: {0}")]
    EngineUnavailable(String),

    /// A page load did not reach its wait condition in time.
    ///
    /// Also raised when fonts do not settle within their bound.
    #[error("Navigation timeout: {0}")]
    NavigationTimeout(String),

    /// A page load failed at the network level (DNS, TLS, refused connection).
    #[error("Navigation failed: {0}")]
    NavigationError(String),

    /// The rendered body could not be measured.
    ///
    /// No fallback height is ever substituted for this.
    #[error("Measurement failed: {0}")]
    MeasurementError(String),

    /// The PDF print call itself failed.
    #[error("PDF export failed: {0}")]
    ExportError(String),

    /// The whole conversion exceeded the service's operation timeout.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Invalid service configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unexpected failure, such as a panicked blocking task.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    /// HTTP status code for this error.
    ///
    /// ```rust
    /// use html2pdf_render::ConvertError;
    ///
    /// assert_eq!(ConvertError::InvalidRequest("x".into()).status_code(), 400);
    /// assert_eq!(ConvertError::NavigationTimeout("x".into()).status_code(), 504);
    /// ```
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) => 400,
            Self::NavigationError(_) => 502,
            Self::EngineUnavailable(_) => 503,
            Self::NavigationTimeout(_) | Self::Timeout(_) => 504,
            Self::MeasurementError(_)
            | Self::ExportError(_)
            | Self::Configuration(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Machine-readable error code for API clients.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::EngineUnavailable(_) => "ENGINE_UNAVAILABLE",
            Self::NavigationTimeout(_) => "NAVIGATION_TIMEOUT",
            Self::NavigationError(_) => "NAVIGATION_ERROR",
            Self::MeasurementError(_) => "MEASUREMENT_ERROR",
            Self::ExportError(_) => "EXPORT_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Convenience conversion from [`String`] to [`ConvertError::Configuration`].
///
/// Lets config builders that return `Result<_, String>` be used with `?`.
impl From<String> for ConvertError {
    fn from(msg: String) -> Self {
        ConvertError::Configuration(msg)
    }
}

/// Convenience conversion from `&str` to [`ConvertError::Configuration`].
impl From<&str> for ConvertError {
    fn from(msg: &str) -> Self {
        ConvertError::Configuration(msg.to_string())
    }
}

/// Result type alias using [`ConvertError`].
pub type Result<T> = std::result::Result<T, ConvertError>;

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Verifies conversions from String and &str land in Configuration.
    #[test]
    fn test_error_conversion() {
        let error: ConvertError = "bad ttl".into();
        assert_eq!(error, ConvertError::Configuration("bad ttl".to_string()));

        let error: ConvertError = "bad bind".to_string().into();
        assert!(matches!(error, ConvertError::Configuration(_)));
    }

    /// Verifies Display keeps the underlying message intact.
    #[test]
    fn test_error_display() {
        let error = ConvertError::NavigationError("net::ERR_NAME_NOT_RESOLVED".to_string());
        assert_eq!(
            error.to_string(),
            "Navigation failed: net::ERR_NAME_NOT_RESOLVED"
        );

        let error = ConvertError::MeasurementError("document has no body".to_string());
        assert_eq!(error.to_string(), "Measurement failed: document has no body");
    }

    /// Verifies the status mapping for each error kind.
    #[test]
    fn test_status_codes() {
        let cases = [
            (ConvertError::InvalidRequest(String::new()), 400),
            (ConvertError::EngineUnavailable(String::new()), 503),
            (ConvertError::NavigationTimeout(String::new()), 504),
            (ConvertError::NavigationError(String::new()), 502),
            (ConvertError::MeasurementError(String::new()), 500),
            (ConvertError::ExportError(String::new()), 500),
            (ConvertError::Timeout(String::new()), 504),
            (ConvertError::Configuration(String::new()), 500),
            (ConvertError::Internal(String::new()), 500),
        ];

        for (error, status) in cases {
            assert_eq!(error.status_code(), status, "status for {:?}", error);
        }
    }

    /// Verifies error codes are distinct.
    #[test]
    fn test_error_codes_unique() {
        let codes = [
            ConvertError::InvalidRequest(String::new()).error_code(),
            ConvertError::EngineUnavailable(String::new()).error_code(),
            ConvertError::NavigationTimeout(String::new()).error_code(),
            ConvertError::NavigationError(String::new()).error_code(),
            ConvertError::MeasurementError(String::new()).error_code(),
            ConvertError::ExportError(String::new()).error_code(),
            ConvertError::Timeout(String::new()).error_code(),
            ConvertError::Configuration(String::new()).error_code(),
            ConvertError::Internal(String::new()).error_code(),
        ];
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }

    /// Verifies that ConvertError is Send + Sync + std::error::Error.
    #[test]
    fn test_error_traits() {
        fn assert_error<T: std::error::Error + Send + Sync>() {}
        assert_error::<ConvertError>();
    }
}
