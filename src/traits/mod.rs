//! Traits at the engine boundary.
//!
//! - [`Healthcheck`]: liveness of a browser process

mod healthcheck;

pub use healthcheck::Healthcheck;
