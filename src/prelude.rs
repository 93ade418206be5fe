//! Convenient imports for common usage patterns.
//!
//! ```rust,ignore
//! use html2pdf_render::prelude::*;
//! ```
//!
//! This brings in configuration, the session manager types, the sizing
//! vocabulary and the error type. Service request/response types live in
//! [`crate::service`].
//!
//! # Example
//!
//! ```rust
//! use html2pdf_render::prelude::*;
//!
//! let config = ServiceConfigBuilder::new()
//!     .strategy(LifecycleStrategy::PerRequest)
//!     .build()
//!     .expect("valid configuration");
//!
//! let policy = SizePolicy::from_request_fields(None, Some("210"), None).expect("valid width");
//! assert!(policy.needs_measurement());
//! assert_eq!(config.strategy.as_str(), "per-request");
//! ```

pub use crate::config::{ServiceConfig, ServiceConfigBuilder};
pub use crate::error::{ConvertError, Result};
pub use crate::factory::{BrowserFactory, ChromeBrowserFactory};
pub use crate::lifecycle::{
    BrowserSessionManager, LifecycleStrategy, SharedSessionManager, init_session_manager,
};
pub use crate::loader::{MediaType, WaitUntil};
pub use crate::session::PageSession;
pub use crate::sizing::{Dimension, Margin, PaperFormat, SizePolicy};
pub use crate::stats::SessionStats;
pub use crate::traits::Healthcheck;

#[cfg(feature = "env-config")]
pub use crate::config::env::from_env;

pub use std::sync::Arc;
