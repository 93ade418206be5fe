//! HTML/URL to PDF HTTP server.
//!
//! Run with:
//! ```bash
//! cargo run --features server
//! ```
//!
//! Configuration comes from the environment and an optional `app.env`
//! file; see [`html2pdf_render::config::env`].

use std::sync::Arc;

use html2pdf_render::SharedSessionManager;
use html2pdf_render::config::env::from_env;
use html2pdf_render::init_session_manager;
use html2pdf_render::integrations::axum::{AppState, router};
use tokio::signal;

/// Resolve once Ctrl+C or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("Shutdown signal received, draining requests...");
}

async fn release_browser(manager: SharedSessionManager) {
    let result = tokio::task::spawn_blocking(move || manager.shutdown()).await;
    if let Err(e) = result {
        log::error!("Session manager shutdown failed: {}", e);
    }
    log::info!("Cleanup complete");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let config = from_env()?;
    let manager = init_session_manager(&config).await?;

    let app = router(AppState::new(
        Arc::clone(&manager),
        config.operation_timeout,
    ));

    let listener = tokio::net::TcpListener::bind(config.bind_address.as_str()).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    release_browser(manager).await;
    Ok(())
}
