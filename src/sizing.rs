//! Page size policies and PDF export option resolution.
//!
//! A request picks exactly one [`SizePolicy`]. [`resolve_export_options`]
//! turns it, together with the request's [`Margin`], into a complete
//! [`PdfExportOptions`] value before anything is sent to the browser.
//!
//! # Policies
//!
//! | Policy | Paper passed to the print call |
//! |--------|--------------------------------|
//! | [`SizePolicy::Standard`] | Named format (e.g. A4), no width/height |
//! | [`SizePolicy::Explicit`] | `"<w>mm"` x `"<h>mm"` |
//! | [`SizePolicy::WidthOnly`] | `"<w>mm"` x height measured at that width |
//!
//! # Example
//!
//! ```rust
//! use html2pdf_render::sizing::{resolve_export_options, Dimension, Margin, PaperSize, SizePolicy};
//!
//! let policy = SizePolicy::Explicit {
//!     width: Dimension::parse("100").unwrap(),
//!     height: Dimension::parse("50mm").unwrap(),
//! };
//!
//! let options = resolve_export_options(&policy, Margin::default(), |_| {
//!     unreachable!("explicit sizes are never measured")
//! })
//! .unwrap();
//!
//! match options.paper {
//!     PaperSize::Custom { width, height } => {
//!         assert_eq!(width.to_string(), "100mm");
//!         assert_eq!(height.to_string(), "50mm");
//!     }
//!     PaperSize::Format(_) => unreachable!(),
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};
use crate::probe::MeasuredHeight;
use crate::units::{millimeters_to_pixels, pixels_to_millimeters, round_to_hundredths};

// ============================================================================
// Paper formats
// ============================================================================

/// Named standard paper formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaperFormat {
    /// 297 x 420 mm
    #[serde(alias = "a3")]
    A3,
    /// 210 x 297 mm
    #[default]
    #[serde(alias = "a4")]
    A4,
    /// 148 x 210 mm
    #[serde(alias = "a5")]
    A5,
    /// 8.5 x 11 in
    #[serde(alias = "letter")]
    Letter,
    /// 8.5 x 14 in
    #[serde(alias = "legal")]
    Legal,
    /// 11 x 17 in
    #[serde(alias = "tabloid")]
    Tabloid,
}

impl PaperFormat {
    /// Portrait `(width, height)` in millimeters.
    pub fn dimensions_mm(&self) -> (f64, f64) {
        match self {
            Self::A3 => (297.0, 420.0),
            Self::A4 => (210.0, 297.0),
            Self::A5 => (148.0, 210.0),
            Self::Letter => (215.9, 279.4),
            Self::Legal => (215.9, 355.6),
            Self::Tabloid => (279.4, 431.8),
        }
    }

    /// Format name as accepted in requests.
    pub fn name(&self) -> &'static str {
        match self {
            Self::A3 => "A3",
            Self::A4 => "A4",
            Self::A5 => "A5",
            Self::Letter => "Letter",
            Self::Legal => "Legal",
            Self::Tabloid => "Tabloid",
        }
    }
}

impl std::fmt::Display for PaperFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Dimension
// ============================================================================

/// A page length in millimeters.
///
/// Parsed from either a bare number (`"210"`) or a number with an `mm`
/// suffix (`"210mm"`). Always displays with a single `mm` suffix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimension(f64);

impl Dimension {
    /// Parse a request dimension.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::InvalidRequest`] if the value is not a
    /// finite, positive number of millimeters.
    ///
    /// ```rust
    /// use html2pdf_render::sizing::Dimension;
    ///
    /// assert_eq!(Dimension::parse("210").unwrap().to_string(), "210mm");
    /// assert_eq!(Dimension::parse(" 80.5mm ").unwrap().to_string(), "80.5mm");
    /// assert!(Dimension::parse("10px").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let number = trimmed
            .strip_suffix("mm")
            .or_else(|| trimmed.strip_suffix("MM"))
            .unwrap_or(trimmed)
            .trim();

        match number.parse::<f64>() {
            Ok(mm) if mm.is_finite() && mm > 0.0 => Ok(Self(mm)),
            _ => Err(ConvertError::InvalidRequest(format!(
                "invalid dimension '{}': expected millimeters such as \"210\" or \"210mm\"",
                input
            ))),
        }
    }

    /// Wrap an already computed millimeter value.
    pub fn from_millimeters(mm: f64) -> Self {
        Self(mm)
    }

    /// Length in millimeters.
    #[inline]
    pub fn millimeters(&self) -> f64 {
        self.0
    }

    /// Length in CSS pixels, rounded to the nearest pixel.
    #[inline]
    pub fn to_pixels(&self) -> u32 {
        millimeters_to_pixels(self.0).round() as u32
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}mm", self.0)
    }
}

// ============================================================================
// Margin
// ============================================================================

/// Page margins in millimeters.
///
/// Passed to the print call unchanged; missing fields default to 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
    /// Top margin (mm).
    pub top: f64,
    /// Right margin (mm).
    pub right: f64,
    /// Bottom margin (mm).
    pub bottom: f64,
    /// Left margin (mm).
    pub left: f64,
}

impl Margin {
    /// Margins with explicit values for each side.
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

// ============================================================================
// Policy and options
// ============================================================================

/// How the output page size is decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizePolicy {
    /// A named paper format.
    Standard(PaperFormat),
    /// Caller-supplied width and height.
    Explicit {
        /// Page width.
        width: Dimension,
        /// Page height.
        height: Dimension,
    },
    /// Caller-supplied width; height is measured from the rendered content.
    WidthOnly {
        /// Page width.
        width: Dimension,
    },
}

impl Default for SizePolicy {
    fn default() -> Self {
        Self::Standard(PaperFormat::A4)
    }
}

impl SizePolicy {
    /// Build a policy from the optional request fields.
    ///
    /// A named `size` wins. Otherwise width and height together give
    /// [`Explicit`](Self::Explicit), width alone gives
    /// [`WidthOnly`](Self::WidthOnly), and nothing gives A4. Blank strings
    /// count as absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::InvalidRequest`] if a present dimension does
    /// not parse.
    pub fn from_request_fields(
        size: Option<PaperFormat>,
        width: Option<&str>,
        height: Option<&str>,
    ) -> Result<Self> {
        if let Some(format) = size {
            return Ok(Self::Standard(format));
        }

        let width = width.filter(|w| !w.trim().is_empty());
        let height = height.filter(|h| !h.trim().is_empty());

        match (width, height) {
            (Some(w), Some(h)) => Ok(Self::Explicit {
                width: Dimension::parse(w)?,
                height: Dimension::parse(h)?,
            }),
            (Some(w), None) => Ok(Self::WidthOnly {
                width: Dimension::parse(w)?,
            }),
            _ => Ok(Self::default()),
        }
    }

    /// Whether resolving this policy needs a content measurement.
    #[inline]
    pub fn needs_measurement(&self) -> bool {
        matches!(self, Self::WidthOnly { .. })
    }
}

/// Final paper size handed to the print call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaperSize {
    /// A named format; no explicit width or height.
    Format(PaperFormat),
    /// Explicit dimensions.
    Custom {
        /// Page width.
        width: Dimension,
        /// Page height.
        height: Dimension,
    },
}

impl PaperSize {
    /// `(width, height)` in millimeters.
    pub fn dimensions_mm(&self) -> (f64, f64) {
        match self {
            Self::Format(format) => format.dimensions_mm(),
            Self::Custom { width, height } => (width.millimeters(), height.millimeters()),
        }
    }
}

/// Fully resolved options for one PDF export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfExportOptions {
    /// Paper size.
    pub paper: PaperSize,
    /// Margins in millimeters, as requested.
    pub margin: Margin,
    /// Always `true`: author backgrounds are kept in print output.
    pub print_background: bool,
}

impl PdfExportOptions {
    /// Check that the resolved page can actually be printed.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::ExportError`] for a non-positive page size or
    /// margins that leave no printable area.
    pub fn validate(&self) -> Result<()> {
        let (width, height) = self.paper.dimensions_mm();
        if !(width > 0.0 && height > 0.0) {
            return Err(ConvertError::ExportError(format!(
                "invalid page size {}mm x {}mm",
                width, height
            )));
        }

        let m = &self.margin;
        if [m.top, m.right, m.bottom, m.left]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(ConvertError::ExportError(format!(
                "invalid margin {:?}",
                m
            )));
        }
        if m.left + m.right >= width || m.top + m.bottom >= height {
            return Err(ConvertError::ExportError(format!(
                "margins {:?} leave no printable area on a {}mm x {}mm page",
                m, width, height
            )));
        }

        Ok(())
    }
}

/// Resolve a size policy into export options.
///
/// `measure` is called with the page width in pixels, and only for
/// [`SizePolicy::WidthOnly`]. It returns the rendered content height, which
/// becomes the page height rounded to hundredths of a millimeter.
///
/// # Errors
///
/// Propagates whatever `measure` returns.
pub fn resolve_export_options<F>(
    policy: &SizePolicy,
    margin: Margin,
    measure: F,
) -> Result<PdfExportOptions>
where
    F: FnOnce(u32) -> Result<MeasuredHeight>,
{
    let paper = match *policy {
        SizePolicy::Standard(format) => PaperSize::Format(format),
        SizePolicy::Explicit { width, height } => PaperSize::Custom { width, height },
        SizePolicy::WidthOnly { width } => {
            let width_px = width.to_pixels();
            let measured = measure(width_px)?;
            let height_mm =
                round_to_hundredths(pixels_to_millimeters(f64::from(measured.pixels())));

            log::debug!(
                "Measured {}px at {}px wide -> page {} x {}mm",
                measured.pixels(),
                width_px,
                width,
                height_mm
            );

            PaperSize::Custom {
                width,
                height: Dimension::from_millimeters(height_mm),
            }
        }
    };

    Ok(PdfExportOptions {
        paper,
        margin,
        print_background: true,
    })
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn never_measure(_: u32) -> Result<MeasuredHeight> {
        panic!("measurement must not run for this policy");
    }

    /// Verifies bare and suffixed dimensions normalize to one "mm".
    #[test]
    fn test_dimension_parse() {
        assert_eq!(Dimension::parse("100").unwrap().to_string(), "100mm");
        assert_eq!(Dimension::parse("100mm").unwrap().to_string(), "100mm");
        assert_eq!(Dimension::parse("80.5 mm").unwrap().to_string(), "80.5mm");
        assert_eq!(Dimension::parse("12MM").unwrap().millimeters(), 12.0);
    }

    /// Verifies bad dimensions are rejected as invalid requests.
    #[test]
    fn test_dimension_parse_rejects() {
        for input in ["", "abc", "0", "-5", "10px", "NaN", "inf", "mm"] {
            let err = Dimension::parse(input).unwrap_err();
            assert!(
                matches!(err, ConvertError::InvalidRequest(_)),
                "'{}' should be rejected, got {:?}",
                input,
                err
            );
        }
    }

    /// Verifies the A4 width converts to 794 px.
    #[test]
    fn test_dimension_to_pixels() {
        assert_eq!(Dimension::parse("210").unwrap().to_pixels(), 794);
    }

    /// Verifies explicit width/height resolve deterministically.
    #[test]
    fn test_resolve_explicit_is_deterministic() {
        let policy = SizePolicy::Explicit {
            width: Dimension::parse("100").unwrap(),
            height: Dimension::parse("50").unwrap(),
        };

        let first = resolve_export_options(&policy, Margin::default(), never_measure).unwrap();
        let second = resolve_export_options(&policy, Margin::default(), never_measure).unwrap();
        assert_eq!(first, second);

        match first.paper {
            PaperSize::Custom { width, height } => {
                assert_eq!(width.to_string(), "100mm");
                assert_eq!(height.to_string(), "50mm");
            }
            other => panic!("expected custom size, got {:?}", other),
        }
    }

    /// Verifies the standard policy sets a format and no dimensions.
    #[test]
    fn test_resolve_standard() {
        let options = resolve_export_options(
            &SizePolicy::Standard(PaperFormat::A4),
            Margin::default(),
            never_measure,
        )
        .unwrap();

        assert_eq!(options.paper, PaperSize::Format(PaperFormat::A4));
        assert!(options.print_background);
    }

    /// Verifies width-only measures at the converted pixel width.
    #[test]
    fn test_resolve_width_only() {
        let policy = SizePolicy::WidthOnly {
            width: Dimension::parse("210mm").unwrap(),
        };

        let mut seen_width = None;
        let options = resolve_export_options(&policy, Margin::default(), |px| {
            seen_width = Some(px);
            Ok(MeasuredHeight::from_pixels(1000))
        })
        .unwrap();

        assert_eq!(seen_width, Some(794));
        match options.paper {
            PaperSize::Custom { width, height } => {
                assert_eq!(width.to_string(), "210mm");
                // 1000px / 3.77952756 = 264.583...
                assert_eq!(height.to_string(), "264.58mm");
            }
            other => panic!("expected custom size, got {:?}", other),
        }
    }

    /// Verifies a measurement failure aborts resolution unchanged.
    #[test]
    fn test_resolve_width_only_propagates_measurement_error() {
        let policy = SizePolicy::WidthOnly {
            width: Dimension::parse("100").unwrap(),
        };

        let err = resolve_export_options(&policy, Margin::default(), |_| {
            Err(ConvertError::MeasurementError("no body".to_string()))
        })
        .unwrap_err();

        assert_eq!(err, ConvertError::MeasurementError("no body".to_string()));
    }

    /// Verifies margins reach the options untouched.
    #[test]
    fn test_margin_passthrough() {
        let margin = Margin::new(10.0, 5.0, 10.0, 5.0);
        let options = resolve_export_options(
            &SizePolicy::Standard(PaperFormat::A4),
            margin,
            never_measure,
        )
        .unwrap();

        assert_eq!(options.margin, margin);
    }

    /// Verifies request-field mapping precedence.
    #[test]
    fn test_policy_from_request_fields() {
        assert_eq!(
            SizePolicy::from_request_fields(Some(PaperFormat::Letter), Some("100"), Some("50"))
                .unwrap(),
            SizePolicy::Standard(PaperFormat::Letter)
        );
        assert!(matches!(
            SizePolicy::from_request_fields(None, Some("100"), Some("50")).unwrap(),
            SizePolicy::Explicit { .. }
        ));
        assert!(matches!(
            SizePolicy::from_request_fields(None, Some("100"), None).unwrap(),
            SizePolicy::WidthOnly { .. }
        ));
        assert!(matches!(
            SizePolicy::from_request_fields(None, Some("100"), Some("  ")).unwrap(),
            SizePolicy::WidthOnly { .. }
        ));
        assert_eq!(
            SizePolicy::from_request_fields(None, None, Some("50")).unwrap(),
            SizePolicy::Standard(PaperFormat::A4)
        );
        assert_eq!(
            SizePolicy::from_request_fields(None, Some(""), None).unwrap(),
            SizePolicy::Standard(PaperFormat::A4)
        );
    }

    /// Verifies only width-only policies need a measurement.
    #[test]
    fn test_policy_needs_measurement() {
        assert!(!SizePolicy::Standard(PaperFormat::A4).needs_measurement());
        assert!(
            !SizePolicy::from_request_fields(None, Some("100"), Some("50"))
                .unwrap()
                .needs_measurement()
        );
        assert!(
            SizePolicy::from_request_fields(None, Some("80"), None)
                .unwrap()
                .needs_measurement()
        );
    }

    /// Verifies a bad width surfaces as an invalid request.
    #[test]
    fn test_policy_from_request_fields_invalid() {
        let err = SizePolicy::from_request_fields(None, Some("wide"), None).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidRequest(_)));
    }

    /// Verifies export option validation.
    #[test]
    fn test_validate_options() {
        let ok = PdfExportOptions {
            paper: PaperSize::Format(PaperFormat::A4),
            margin: Margin::new(10.0, 10.0, 10.0, 10.0),
            print_background: true,
        };
        assert!(ok.validate().is_ok());

        let zero_height = PdfExportOptions {
            paper: PaperSize::Custom {
                width: Dimension::from_millimeters(100.0),
                height: Dimension::from_millimeters(0.0),
            },
            ..ok
        };
        assert!(matches!(
            zero_height.validate(),
            Err(ConvertError::ExportError(_))
        ));

        let margins_too_wide = PdfExportOptions {
            margin: Margin::new(0.0, 110.0, 0.0, 110.0),
            ..ok
        };
        assert!(matches!(
            margins_too_wide.validate(),
            Err(ConvertError::ExportError(_))
        ));
    }

    /// Verifies paper format deserialization accepts both cases.
    #[test]
    fn test_paper_format_serde() {
        let upper: PaperFormat = serde_json::from_str("\"A4\"").unwrap();
        let lower: PaperFormat = serde_json::from_str("\"letter\"").unwrap();
        assert_eq!(upper, PaperFormat::A4);
        assert_eq!(lower, PaperFormat::Letter);
        assert!(serde_json::from_str::<PaperFormat>("\"B5\"").is_err());
    }
}
