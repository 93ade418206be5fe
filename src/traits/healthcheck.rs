//! Liveness check for browser processes.
//!
//! [`SharedInstanceLifecycle`](crate::SharedInstanceLifecycle) pings its
//! browser on warmup and whenever readiness is asked for. A failed ping
//! makes `/ready` answer 503; the browser itself is replaced on the next
//! failed page acquisition.

use crate::error::Result;

/// Something that can prove it is still responsive.
///
/// # Implementation Guidelines
///
/// - Keep it cheap: `/ready` may call it on every probe
/// - Clean up anything created during the check
///
/// # Example
///
/// ```rust,ignore
/// use html2pdf_render::{ConvertError, Healthcheck, Result};
///
/// struct Remote(SomeClient);
///
/// impl Healthcheck for Remote {
///     fn ping(&self) -> Result<()> {
///         self.0.version()
///             .map(|_| ())
///             .map_err(|e| ConvertError::EngineUnavailable(e.to_string()))
///     }
/// }
/// ```
pub trait Healthcheck: Send + Sync {
    /// Perform the check.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::EngineUnavailable`](crate::ConvertError::EngineUnavailable)
    /// if the target is unresponsive.
    fn ping(&self) -> Result<()>;
}
