//! Browser process factories.
//!
//! This module provides the [`BrowserFactory`] trait, which the lifecycle
//! managers call whenever they need a new browser process.
//!
//! # Available Factories
//!
//! | Factory | Description |
//! |---------|-------------|
//! | [`ChromeBrowserFactory`] | Launches headless Chrome/Chromium |
//! | [`mock::MockBrowserFactory`] | Counts and fails launches (feature-gated) |
//!
//! # Example
//!
//! ```rust,ignore
//! use html2pdf_render::{BrowserFactory, ChromeBrowserFactory};
//!
//! let factory = ChromeBrowserFactory::with_defaults();
//! let browser = factory.create()?;
//! ```

mod chrome;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use chrome::{ChromeBrowserFactory, create_chrome_options};

use headless_chrome::Browser;

use crate::error::Result;

/// Launches browser processes.
///
/// Shared between request threads by the lifecycle managers, hence
/// `Send + Sync`.
pub trait BrowserFactory: Send + Sync {
    /// Launch a new browser.
    ///
    /// # Errors
    ///
    /// - [`ConvertError::Configuration`](crate::ConvertError::Configuration)
    ///   if launch options cannot be built
    /// - [`ConvertError::EngineUnavailable`](crate::ConvertError::EngineUnavailable)
    ///   if the binary is missing or the process fails to start
    fn create(&self) -> Result<Browser>;
}
