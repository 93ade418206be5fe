//! Integration tests for the conversion pipeline.
//!
//! Runs whole conversions against scripted pages; no Chrome required.

use std::time::Duration;

use html2pdf_render::driver::DriverError;
use html2pdf_render::driver::mock::{MOCK_PDF_BYTES, MockScript, MockSessionManager, PageCall};
use html2pdf_render::prelude::*;
use html2pdf_render::service::{
    self, ConversionRequest, PdfFromHtmlRequest, PdfFromUrlRequest,
};
use html2pdf_render::{PaperSize, PdfExportOptions};

fn printed_options(calls: &[PageCall]) -> Option<PdfExportOptions> {
    calls.iter().find_map(|call| match call {
        PageCall::PrintToPdf(options) => Some(*options),
        _ => None,
    })
}

fn width_only(mm: &str) -> SizePolicy {
    SizePolicy::WidthOnly {
        width: Dimension::parse(mm).unwrap(),
    }
}

/// Test that a default HTML request prints one A4 page from one session.
#[test]
fn test_html_default_prints_a4() {
    let manager = MockSessionManager::default();
    let request = ConversionRequest::html("Invoice", "<h1>Invoice</h1>");

    let pdf = service::generate_pdf(&manager, &request).unwrap();

    assert_eq!(pdf.data, MOCK_PDF_BYTES);
    assert_eq!(pdf.filename, "Invoice.pdf");
    assert_eq!(manager.acquisitions(), 1);

    let pages = manager.page_calls();
    let options = printed_options(&pages[0]).unwrap();
    assert_eq!(options.paper, PaperSize::Format(PaperFormat::A4));
    assert!(options.print_background);
    assert_eq!(pages[0].last(), Some(&PageCall::Close));
    assert!(manager.stats().is_idle());
}

/// Test that width-only HTML is measured in a probe page at the export width.
#[test]
fn test_html_width_only_uses_probe() {
    let manager = MockSessionManager::new(MockScript {
        body_height: Some(1000.0),
        ..MockScript::default()
    });
    let request =
        ConversionRequest::html("Receipt", "<p>line</p>").with_size_policy(width_only("80"));

    service::generate_pdf(&manager, &request).unwrap();

    // export page first, probe second
    let pages = manager.page_calls();
    assert_eq!(pages.len(), 2);

    let probe = &pages[1];
    assert_eq!(
        probe.first(),
        Some(&PageCall::SetViewport {
            width: 302,
            height: 10
        })
    );
    assert!(printed_options(probe).is_none(), "probe must never print");
    assert_eq!(probe.last(), Some(&PageCall::Close));

    let options = printed_options(&pages[0]).unwrap();
    match options.paper {
        PaperSize::Custom { width, height } => {
            assert_eq!(width.millimeters(), 80.0);
            assert_eq!(height.millimeters(), 264.58);
        }
        other => panic!("expected custom paper, got {:?}", other),
    }
    assert!(manager.stats().is_idle());
}

/// Test that sizing the measuring page never resizes the export page.
#[test]
fn test_width_only_viewport_stays_on_measuring_page() {
    let manager = MockSessionManager::default();
    let request =
        ConversionRequest::html("Ticket", "<p>row</p>").with_size_policy(width_only("58"));

    service::generate_pdf(&manager, &request).unwrap();

    let pages = manager.page_calls();
    let resized = |calls: &[PageCall]| {
        calls
            .iter()
            .any(|call| matches!(call, PageCall::SetViewport { .. }))
    };
    assert!(!resized(&pages[0]), "export page was resized: {:?}", pages[0]);
    assert!(resized(&pages[1]));
}

/// Test that explicit sizes skip measurement entirely.
#[test]
fn test_html_explicit_size_no_probe() {
    let manager = MockSessionManager::default();
    let request = ConversionRequest::html("Label", "<p>label</p>").with_size_policy(
        SizePolicy::Explicit {
            width: Dimension::parse("100").unwrap(),
            height: Dimension::parse("50mm").unwrap(),
        },
    );

    service::generate_pdf(&manager, &request).unwrap();

    assert_eq!(manager.acquisitions(), 1);
    let options = printed_options(&manager.page_calls()[0]).unwrap();
    assert_eq!(options.paper.dimensions_mm(), (100.0, 50.0));
}

/// Test that margins reach the print call unchanged.
#[test]
fn test_margins_passed_through() {
    let manager = MockSessionManager::default();
    let margin = Margin::new(10.0, 5.0, 10.0, 5.0);
    let request = ConversionRequest::html("Margins", "<p>x</p>").with_margin(margin);

    service::generate_pdf(&manager, &request).unwrap();

    let options = printed_options(&manager.page_calls()[0]).unwrap();
    assert_eq!(options.margin, margin);
}

/// Test that URL requests emulate media before navigating.
#[test]
fn test_url_emulates_media_before_navigation() {
    let manager = MockSessionManager::default();
    let body = serde_json::json!({
        "title": "Docs",
        "url": "https://example.com/docs",
        "waitUntil": "load",
        "emulateMedia": "print"
    });
    let dto: PdfFromUrlRequest = serde_json::from_value(body).unwrap();
    let request = ConversionRequest::try_from(dto).unwrap();

    let pdf = service::generate_pdf(&manager, &request).unwrap();
    assert_eq!(pdf.filename, "Docs.pdf");

    let calls = &manager.page_calls()[0];
    assert_eq!(calls[0], PageCall::EmulateMedia(MediaType::Print));
    assert_eq!(calls[1], PageCall::Navigate("https://example.com/docs".to_string()));
}

/// Test that width-only URLs measure the loaded page without a probe.
#[test]
fn test_url_width_only_measures_in_place() {
    let manager = MockSessionManager::new(MockScript {
        body_height: Some(377.9),
        ..MockScript::default()
    });
    let request =
        ConversionRequest::url("Page", "https://example.com").with_size_policy(width_only("210"));

    service::generate_pdf(&manager, &request).unwrap();

    assert_eq!(manager.acquisitions(), 1);
    let options = printed_options(&manager.page_calls()[0]).unwrap();
    assert_eq!(options.paper.dimensions_mm(), (210.0, 100.01));
}

/// Test that an unavailable engine surfaces as EngineUnavailable.
#[test]
fn test_engine_unavailable() {
    let manager = MockSessionManager::default().unavailable("chrome not found");
    let request = ConversionRequest::html("x", "<p>x</p>");

    let err = service::generate_pdf(&manager, &request).unwrap_err();

    assert!(matches!(err, ConvertError::EngineUnavailable(_)));
    assert_eq!(err.status_code(), 503);
    assert!(manager.stats().is_idle());
}

/// Test that a probe acquisition failure still releases the export page.
#[test]
fn test_probe_failure_releases_export_page() {
    let manager = MockSessionManager::default().failing_after(1, "browser crashed");
    let request = ConversionRequest::html("x", "<p>x</p>").with_size_policy(width_only("80"));

    let err = service::generate_pdf(&manager, &request).unwrap_err();

    assert!(matches!(err, ConvertError::EngineUnavailable(_)));
    assert_eq!(manager.acquisitions(), 2);
    let pages = manager.page_calls();
    assert_eq!(pages.len(), 1);
    assert!(printed_options(&pages[0]).is_none());
    assert_eq!(pages[0].last(), Some(&PageCall::Close));
    assert!(manager.stats().is_idle());
}

/// Test that a document without a body fails measurement and leaks nothing.
#[test]
fn test_missing_body_is_measurement_error() {
    let manager = MockSessionManager::new(MockScript {
        body_height: None,
        ..MockScript::default()
    });
    let request = ConversionRequest::html("x", "<p>x</p>").with_size_policy(width_only("80"));

    let err = service::generate_pdf(&manager, &request).unwrap_err();

    assert!(matches!(err, ConvertError::MeasurementError(_)));
    assert_eq!(manager.stats().pages_closed, 2);
    assert!(manager.stats().is_idle());
}

/// Test that a print failure is an export error.
#[test]
fn test_print_failure_is_export_error() {
    let manager = MockSessionManager::new(MockScript {
        print_error: Some(DriverError::Failed("Printing failed".to_string())),
        ..MockScript::default()
    });
    let request = ConversionRequest::html("x", "<p>x</p>");

    let err = service::generate_pdf(&manager, &request).unwrap_err();

    assert!(matches!(err, ConvertError::ExportError(_)));
    assert!(manager.stats().is_idle());
}

/// Test that navigation failures map to NavigationError.
#[test]
fn test_navigation_failure() {
    let manager = MockSessionManager::new(MockScript {
        navigate_error: Some(DriverError::Failed("net::ERR_NAME_NOT_RESOLVED".to_string())),
        ..MockScript::default()
    });
    let request = ConversionRequest::url("x", "https://nowhere.invalid");

    let err = service::generate_pdf(&manager, &request).unwrap_err();

    assert!(matches!(err, ConvertError::NavigationError(_)));
    assert_eq!(err.status_code(), 502);
}

/// Test that a URL whose document never leaves `loading` times out and
/// releases its page.
#[test]
fn test_url_load_state_timeout_releases_page() {
    let manager = MockSessionManager::new(MockScript {
        ready_state: "loading".to_string(),
        ..MockScript::default()
    });
    let mut request = ConversionRequest::url("x", "https://slow.example.com");
    request.timeout = Duration::from_millis(200);

    let err = service::generate_pdf(&manager, &request).unwrap_err();

    assert!(matches!(err, ConvertError::NavigationTimeout(_)), "{:?}", err);
    assert_eq!(err.status_code(), 504);
    assert_eq!(manager.acquisitions(), 1);
    assert!(manager.stats().is_idle());
}

/// Test that a navigation the engine gives up on is a timeout, page released.
#[test]
fn test_url_navigate_timeout_releases_page() {
    let manager = MockSessionManager::new(MockScript {
        navigate_error: Some(DriverError::Timeout("Page.navigate".to_string())),
        ..MockScript::default()
    });
    let request = ConversionRequest::url("x", "https://slow.example.com");

    let err = service::generate_pdf(&manager, &request).unwrap_err();

    assert!(matches!(err, ConvertError::NavigationTimeout(_)), "{:?}", err);
    let pages = manager.page_calls();
    assert!(printed_options(&pages[0]).is_none());
    assert_eq!(pages[0].last(), Some(&PageCall::Close));
    assert!(manager.stats().is_idle());
}

/// Test that a blank-page timeout on width-only HTML releases both pages.
#[test]
fn test_html_navigate_timeout_releases_pages() {
    let manager = MockSessionManager::new(MockScript {
        navigate_error: Some(DriverError::Timeout("Page.navigate".to_string())),
        ..MockScript::default()
    });
    let request = ConversionRequest::html("x", "<p>x</p>").with_size_policy(width_only("80"));

    let err = service::generate_pdf(&manager, &request).unwrap_err();

    assert!(matches!(err, ConvertError::NavigationTimeout(_)), "{:?}", err);
    assert_eq!(manager.stats().pages_closed, 2);
    assert!(manager.stats().is_idle());
}

/// Test that inline content whose fonts never settle times out and releases
/// its page.
///
/// Waits out the fixed inline font bound, so this takes about 30 seconds.
#[test]
fn test_html_fonts_timeout_releases_page() {
    let manager = MockSessionManager::new(MockScript {
        fonts_status: "loading".to_string(),
        ..MockScript::default()
    });
    let request = ConversionRequest::html("x", "<p>x</p>");

    let err = service::generate_pdf(&manager, &request).unwrap_err();

    assert!(matches!(err, ConvertError::NavigationTimeout(ref m) if m.contains("fonts")));
    let pages = manager.page_calls();
    assert!(printed_options(&pages[0]).is_none());
    assert!(manager.stats().is_idle());
}

/// Test that request bodies map onto size policies.
#[test]
fn test_request_body_size_policies() {
    let parse = |body: serde_json::Value| {
        let dto: PdfFromHtmlRequest = serde_json::from_value(body).unwrap();
        ConversionRequest::try_from(dto).unwrap().size_policy
    };

    assert_eq!(
        parse(serde_json::json!({ "html": "<p/>", "size": "Letter", "width": "80" })),
        SizePolicy::Standard(PaperFormat::Letter)
    );
    assert_eq!(
        parse(serde_json::json!({ "html": "<p/>", "width": 80, "height": "120mm" })),
        SizePolicy::Explicit {
            width: Dimension::parse("80").unwrap(),
            height: Dimension::parse("120").unwrap(),
        }
    );
    assert_eq!(
        parse(serde_json::json!({ "html": "<p/>", "width": "80", "height": "" })),
        width_only("80")
    );
    assert_eq!(
        parse(serde_json::json!({ "html": "<p/>" })),
        SizePolicy::Standard(PaperFormat::A4)
    );
}

/// Test that bad dimensions are rejected before any page is opened.
#[test]
fn test_invalid_dimension_rejected() {
    let dto: PdfFromHtmlRequest =
        serde_json::from_value(serde_json::json!({ "html": "<p/>", "width": "abc" })).unwrap();

    let err = ConversionRequest::try_from(dto).unwrap_err();

    assert!(matches!(err, ConvertError::InvalidRequest(_)));
    assert_eq!(err.status_code(), 400);
}

/// Test that the configured lifecycle decides which manager is built.
#[test]
fn test_build_session_manager_strategy() {
    let config = ServiceConfigBuilder::new()
        .strategy(LifecycleStrategy::PerRequest)
        .build()
        .unwrap();
    assert_eq!(html2pdf_render::build_session_manager(&config).name(), "per-request");

    let config = ServiceConfig::default();
    let manager = html2pdf_render::build_session_manager(&config);
    assert_eq!(manager.name(), "shared");
    assert_eq!(manager.stats().browsers_launched, 0, "building must not launch");
}
