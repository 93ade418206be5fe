//! Service configuration.
//!
//! This module provides [`ServiceConfig`] and [`ServiceConfigBuilder`] for
//! choosing the browser lifecycle and the service's time bounds.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use html2pdf_render::{LifecycleStrategy, ServiceConfigBuilder};
//!
//! let config = ServiceConfigBuilder::new()
//!     .strategy(LifecycleStrategy::PerRequest)
//!     .operation_timeout(Duration::from_secs(30))
//!     .build()
//!     .expect("Invalid configuration");
//!
//! assert_eq!(config.strategy, LifecycleStrategy::PerRequest);
//! ```
//!
//! # Environment Configuration
//!
//! With the `env-config` feature, configuration can be read from
//! environment variables and an optional `app.env` file. See [`mod@env`].

use std::time::Duration;

use crate::lifecycle::LifecycleStrategy;

/// Default address the HTTP server binds to.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Service configuration.
///
/// # Fields Overview
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `strategy` | shared | Browser lifecycle |
/// | `browser_ttl` | 1 hour | Shared browser lifetime |
/// | `warmup_timeout` | 60s | Startup launch bound |
/// | `operation_timeout` | 120s | Whole-conversion bound |
/// | `chrome_path` | auto-detect | Chrome binary |
/// | `bind_address` | `0.0.0.0:3000` | HTTP listen address |
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Which browser lifecycle serves pages.
    pub strategy: LifecycleStrategy,

    /// Age after which the shared browser is relaunched.
    ///
    /// Ignored by the per-request lifecycle.
    pub browser_ttl: Duration,

    /// Upper bound on launching and pinging the browser at startup.
    pub warmup_timeout: Duration,

    /// Upper bound on one whole conversion, enforced by the HTTP layer.
    ///
    /// Must exceed the per-step navigation timeouts or those will never
    /// get the chance to fire.
    pub operation_timeout: Duration,

    /// Chrome binary; `None` lets `headless_chrome` find one.
    pub chrome_path: Option<String>,

    /// HTTP listen address.
    pub bind_address: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            strategy: LifecycleStrategy::default(),
            browser_ttl: Duration::from_secs(3600),
            warmup_timeout: Duration::from_secs(60),
            operation_timeout: Duration::from_secs(120),
            chrome_path: None,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
        }
    }
}

/// Builder for [`ServiceConfig`] with validation.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use html2pdf_render::ServiceConfigBuilder;
///
/// let config = ServiceConfigBuilder::new()
///     .browser_ttl(Duration::from_secs(600))
///     .chrome_path(Some("/usr/bin/chromium".to_string()))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.browser_ttl.as_secs(), 600);
/// ```
#[derive(Debug, Default)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    /// Builder starting from defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the browser lifecycle.
    pub fn strategy(mut self, strategy: LifecycleStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Set the shared browser TTL.
    pub fn browser_ttl(mut self, ttl: Duration) -> Self {
        self.config.browser_ttl = ttl;
        self
    }

    /// Set the startup warmup bound.
    pub fn warmup_timeout(mut self, timeout: Duration) -> Self {
        self.config.warmup_timeout = timeout;
        self
    }

    /// Set the whole-conversion bound.
    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.config.operation_timeout = timeout;
        self
    }

    /// Set the Chrome binary path.
    pub fn chrome_path(mut self, path: Option<String>) -> Self {
        self.config.chrome_path = path;
        self
    }

    /// Set the HTTP listen address.
    pub fn bind_address<S: Into<String>>(mut self, address: S) -> Self {
        self.config.bind_address = address.into();
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// - `browser_ttl`, `warmup_timeout` or `operation_timeout` is zero
    /// - `chrome_path` is present but blank
    /// - `bind_address` is blank
    pub fn build(self) -> std::result::Result<ServiceConfig, String> {
        let config = self.config;

        if config.browser_ttl.is_zero() {
            return Err("browser_ttl must be greater than 0".to_string());
        }
        if config.warmup_timeout.is_zero() {
            return Err("warmup_timeout must be greater than 0".to_string());
        }
        if config.operation_timeout.is_zero() {
            return Err("operation_timeout must be greater than 0".to_string());
        }
        if config.chrome_path.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err("chrome_path must not be blank".to_string());
        }
        if config.bind_address.trim().is_empty() {
            return Err("bind_address must not be blank".to_string());
        }

        Ok(config)
    }
}

/// Environment-based configuration loading.
///
/// # Environment Variables
///
/// | Variable | Default |
/// |----------|---------|
/// | `HTML2PDF_LIFECYCLE` | `shared` (`shared` or `per-request`) |
/// | `BROWSER_TTL_SECONDS` | 3600 |
/// | `BROWSER_WARMUP_TIMEOUT_SECONDS` | 60 |
/// | `PDF_OPERATION_TIMEOUT_SECONDS` | 120 |
/// | `CHROME_PATH` | auto-detect |
/// | `BIND_ADDRESS` | `0.0.0.0:3000` |
///
/// Unparseable numbers fall back to their default; an unknown lifecycle
/// name is a configuration error.
#[cfg(feature = "env-config")]
pub mod env {
    use super::*;
    use crate::error::ConvertError;

    /// Default environment file name.
    pub const ENV_FILE_NAME: &str = "app.env";

    /// Load `app.env` from the working directory into the process
    /// environment.
    pub fn load_env_file() -> Result<std::path::PathBuf, dotenvy::Error> {
        dotenvy::from_filename(ENV_FILE_NAME)
    }

    /// Load configuration from the process environment (and `app.env`).
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Configuration`] for an unknown lifecycle or
    /// values that fail validation.
    pub fn from_env() -> Result<ServiceConfig, ConvertError> {
        match load_env_file() {
            Ok(path) => log::info!("📄 Loaded configuration from: {:?}", path),
            Err(e) => log::debug!(
                "No {} file found or failed to load: {} (using environment variables and defaults)",
                ENV_FILE_NAME,
                e
            ),
        }

        from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// [`from_env`] passes the process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<ServiceConfig, ConvertError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let seconds = |key: &str, default: u64| -> u64 {
            lookup(key)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        };

        let strategy = match lookup("HTML2PDF_LIFECYCLE") {
            Some(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => LifecycleStrategy::default(),
        };
        let ttl_seconds = seconds("BROWSER_TTL_SECONDS", 3600);
        let warmup_timeout_seconds = seconds("BROWSER_WARMUP_TIMEOUT_SECONDS", 60);
        let operation_timeout_seconds = seconds("PDF_OPERATION_TIMEOUT_SECONDS", 120);
        let chrome_path = lookup("CHROME_PATH").filter(|p| !p.trim().is_empty());
        let bind_address = lookup("BIND_ADDRESS")
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        log::info!("⚙️ Loading service configuration from environment:");
        log::info!("   - Lifecycle: {}", strategy);
        log::info!(
            "   - Browser TTL: {}s ({}min)",
            ttl_seconds,
            ttl_seconds / 60
        );
        log::info!("   - Warmup timeout: {}s", warmup_timeout_seconds);
        log::info!("   - Operation timeout: {}s", operation_timeout_seconds);
        log::info!(
            "   - Chrome path: {}",
            chrome_path.as_deref().unwrap_or("auto-detect")
        );
        log::info!("   - Bind address: {}", bind_address);

        ServiceConfigBuilder::new()
            .strategy(strategy)
            .browser_ttl(Duration::from_secs(ttl_seconds))
            .warmup_timeout(Duration::from_secs(warmup_timeout_seconds))
            .operation_timeout(Duration::from_secs(operation_timeout_seconds))
            .chrome_path(chrome_path)
            .bind_address(bind_address)
            .build()
            .map_err(ConvertError::Configuration)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
