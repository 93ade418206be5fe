//! Pixel and millimeter conversions.
//!
//! All conversions assume the CSS reference resolution of 96 pixels per inch,
//! which is what Chrome lays pages out at. One millimeter is therefore
//! roughly 3.7795 CSS pixels.
//!
//! # Rounding
//!
//! The functions here never round. Callers pick the rounding that suits
//! their use:
//!
//! | Destination | Rounding |
//! |-------------|----------|
//! | Page dimension in mm | [`round_to_hundredths`] |
//! | Viewport width in px | nearest integer |
//! | Measured content height in px | ceiling (so content is never clipped) |
//!
//! # Example
//!
//! ```rust
//! use html2pdf_render::units::{millimeters_to_pixels, pixels_to_millimeters};
//!
//! let px = millimeters_to_pixels(210.0);
//! assert!((px - 793.7).abs() < 0.01);
//! assert!((pixels_to_millimeters(px) - 210.0).abs() < 1e-6);
//! ```

/// CSS pixels per millimeter used by [`pixels_to_millimeters`].
pub const PIXELS_PER_MILLIMETER: f64 = 3.77952756;

/// CSS reference pixels per inch.
pub const PIXELS_PER_INCH: f64 = 96.0;

/// Millimeters per inch.
pub const MILLIMETERS_PER_INCH: f64 = 25.4;

/// Convert CSS pixels to millimeters.
#[inline]
pub fn pixels_to_millimeters(px: f64) -> f64 {
    px / PIXELS_PER_MILLIMETER
}

/// Convert millimeters to CSS pixels.
#[inline]
pub fn millimeters_to_pixels(mm: f64) -> f64 {
    mm * PIXELS_PER_INCH / MILLIMETERS_PER_INCH
}

/// Convert millimeters to inches.
///
/// The DevTools print call takes paper size and margins in inches, so this
/// is only applied at that boundary.
#[inline]
pub fn millimeters_to_inches(mm: f64) -> f64 {
    mm / MILLIMETERS_PER_INCH
}

/// Round to two decimal places.
///
/// ```rust
/// use html2pdf_render::units::round_to_hundredths;
///
/// assert_eq!(round_to_hundredths(26.458333), 26.46);
/// assert_eq!(round_to_hundredths(100.0), 100.0);
/// ```
#[inline]
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// Unit Tests
// ============================================================================
