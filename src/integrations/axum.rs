//! Axum HTTP surface.
//!
//! # Routes
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | `GET` | `/` | `Service is running` |
//! | `POST` | `/html-to-pdf` | `application/pdf` from [`PdfFromHtmlRequest`] |
//! | `POST` | `/url-to-pdf` | `application/pdf` from [`PdfFromUrlRequest`] |
//! | `POST` | `/html-to-html` | `text/html` from [`HtmlDocumentRequest`] |
//! | `POST` | `/markdown-to-html` | `text/html` from [`MarkdownRequest`] |
//! | `POST` | `/markdown-to-pdf` | `application/pdf` from [`MarkdownRequest`] |
//! | `GET` | `/pdf/test` | sample document on A4 |
//! | `GET` | `/health` | [`HealthResponse`] |
//! | `GET` | `/ready` | 200 or 503 |
//! | `GET` | `/stats` | [`StatsResponse`](crate::service::StatsResponse) |
//!
//! Errors are JSON [`ErrorResponse`] bodies with the status from
//! [`ConvertError::status_code`].
//!
//! # Example
//!
//! ```rust,ignore
//! use html2pdf_render::integrations::axum::{AppState, router};
//!
//! let app = router(AppState::new(manager, config.operation_timeout));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::error::ConvertError;
use crate::lifecycle::SharedSessionManager;
use crate::service::{
    self, ConversionRequest, ErrorResponse, HealthResponse, HtmlDocumentRequest, MarkdownRequest,
    PdfFromHtmlRequest, PdfFromUrlRequest, PdfResponse,
};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Where pages come from.
    pub manager: SharedSessionManager,
    /// Bound on one whole conversion.
    pub operation_timeout: Duration,
}

impl AppState {
    /// State for `manager`, bounding conversions by `operation_timeout`.
    pub fn new(manager: SharedSessionManager, operation_timeout: Duration) -> Self {
        Self {
            manager,
            operation_timeout,
        }
    }
}

/// Build the router with every route bound to `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/html-to-pdf", post(html_to_pdf))
        .route("/url-to-pdf", post(url_to_pdf))
        .route("/html-to-html", post(html_to_html))
        .route("/markdown-to-html", post(markdown_to_html))
        .route("/markdown-to-pdf", post(markdown_to_pdf))
        .route("/pdf/test", get(pdf_test))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/stats", get(session_stats))
        .with_state(state)
}

async fn root() -> &'static str {
    "Service is running"
}

/// `POST /html-to-pdf`
pub async fn html_to_pdf(
    State(state): State<AppState>,
    payload: Result<Json<PdfFromHtmlRequest>, JsonRejection>,
) -> Response {
    let request = match parse_body(payload).and_then(ConversionRequest::try_from) {
        Ok(request) => request,
        Err(e) => return error_response(e),
    };
    convert(&state, request).await
}

/// `POST /url-to-pdf`
pub async fn url_to_pdf(
    State(state): State<AppState>,
    payload: Result<Json<PdfFromUrlRequest>, JsonRejection>,
) -> Response {
    let request = match parse_body(payload).and_then(ConversionRequest::try_from) {
        Ok(request) => request,
        Err(e) => return error_response(e),
    };
    convert(&state, request).await
}

/// `POST /html-to-html`
pub async fn html_to_html(payload: Result<Json<HtmlDocumentRequest>, JsonRejection>) -> Response {
    match parse_body(payload) {
        Ok(request) => html_response(service::wrap_html_document(&request)),
        Err(e) => error_response(e),
    }
}

/// `POST /markdown-to-html`
pub async fn markdown_to_html(payload: Result<Json<MarkdownRequest>, JsonRejection>) -> Response {
    match parse_body(payload) {
        Ok(request) => html_response(service::markdown_to_html(&request)),
        Err(e) => error_response(e),
    }
}

/// `POST /markdown-to-pdf`
pub async fn markdown_to_pdf(
    State(state): State<AppState>,
    payload: Result<Json<MarkdownRequest>, JsonRejection>,
) -> Response {
    let request = match parse_body(payload).and_then(ConversionRequest::try_from) {
        Ok(request) => request,
        Err(e) => return error_response(e),
    };
    convert(&state, request).await
}

/// `GET /pdf/test`
pub async fn pdf_test(State(state): State<AppState>) -> Response {
    convert(&state, service::test_document_request()).await
}

/// `GET /health`
pub async fn health_check(State(state): State<AppState>) -> Response {
    Json(HealthResponse::new(state.manager.name())).into_response()
}

/// `GET /ready`
///
/// Readiness may ping the browser, so it runs on a blocking thread.
pub async fn readiness_check(State(state): State<AppState>) -> Response {
    let manager = Arc::clone(&state.manager);
    let ready = tokio::task::spawn_blocking(move || manager.is_ready())
        .await
        .unwrap_or(false);

    if ready {
        Json(serde_json::json!({ "status": "ready" })).into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "not_ready" })),
        )
            .into_response()
    }
}

/// `GET /stats`
pub async fn session_stats(State(state): State<AppState>) -> Response {
    Json(service::get_session_stats(state.manager.as_ref())).into_response()
}

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ConvertError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ConvertError::InvalidRequest(rejection.body_text()))
}

/// Run one conversion on a blocking thread, bounded by the operation timeout.
///
/// On timeout the blocking work keeps running until its own step timeouts
/// fire; its pages are released then.
async fn convert(state: &AppState, request: ConversionRequest) -> Response {
    let manager = Arc::clone(&state.manager);
    let timeout = state.operation_timeout;

    let result = tokio::time::timeout(
        timeout,
        tokio::task::spawn_blocking(move || service::generate_pdf(manager.as_ref(), &request)),
    )
    .await;

    match result {
        Ok(Ok(Ok(pdf))) => pdf_response(pdf),
        Ok(Ok(Err(e))) => error_response(e),
        Ok(Err(join_error)) => {
            log::error!("Blocking task error: {}", join_error);
            error_response(ConvertError::Internal(join_error.to_string()))
        }
        Err(_) => {
            log::error!("PDF generation timed out after {}s", timeout.as_secs());
            error_response(ConvertError::Timeout(format!(
                "operation timed out after {}ms",
                timeout.as_millis()
            )))
        }
    }
}

fn html_response(document: String) -> Response {
    ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], document).into_response()
}

fn pdf_response(pdf: PdfResponse) -> Response {
    log::info!(
        "PDF generated successfully: {} bytes, filename={}",
        pdf.size(),
        pdf.filename
    );

    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_LENGTH, pdf.size().to_string()),
            (header::CONTENT_DISPOSITION, pdf.content_disposition()),
        ],
        pdf.data,
    )
        .into_response()
}

fn error_response(error: ConvertError) -> Response {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    log::warn!("PDF generation error: {} (HTTP {})", error, status.as_u16());

    (status, Json(ErrorResponse::from(&error))).into_response()
}

// ============================================================================
// Unit Tests
// ============================================================================
