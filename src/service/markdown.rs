//! Markdown front end.
//!
//! Markdown is rendered to HTML with `pulldown-cmark`, wrapped into a full
//! document by [`wrap_html_document`] and then converted like any other
//! inline HTML. Tables and strikethrough are enabled on top of CommonMark;
//! fenced code blocks are CommonMark already.

use pulldown_cmark::{Options, Parser, html};

use super::pdf::wrap_html_document;
use super::types::{ConversionRequest, HtmlDocumentRequest, MarkdownRequest};
use crate::error::{ConvertError, Result};
use crate::sizing::SizePolicy;

const FRONT_MATTER_DELIMITER: &str = "---";

/// Drop a leading YAML front-matter block.
///
/// The block must open on the first line with `---` and close with a line
/// that is exactly `---`. Without a closing line the source is returned
/// unchanged, so a document that starts with a thematic break survives.
pub fn strip_front_matter(source: &str) -> &str {
    let Some(rest) = source.strip_prefix(FRONT_MATTER_DELIMITER) else {
        return source;
    };
    let Some(rest) = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')) else {
        return source;
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        offset += line.len();
        if line.trim_end() == FRONT_MATTER_DELIMITER {
            return rest[offset..].trim_start();
        }
    }
    source
}

/// Render Markdown to an HTML fragment, front matter removed.
pub fn render_markdown(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let body = strip_front_matter(source);
    let mut output = String::with_capacity(body.len() * 3 / 2);
    html::push_html(&mut output, Parser::new_ext(body, options));
    output
}

/// Render `request` into a complete HTML document.
pub fn markdown_to_html(request: &MarkdownRequest) -> String {
    wrap_html_document(&HtmlDocumentRequest {
        title: request.title.clone(),
        content: render_markdown(&request.content),
        css: request.css.clone(),
    })
}

impl TryFrom<MarkdownRequest> for ConversionRequest {
    type Error = ConvertError;

    fn try_from(dto: MarkdownRequest) -> Result<Self> {
        if strip_front_matter(&dto.content).trim().is_empty() {
            return Err(ConvertError::InvalidRequest(
                "markdown content must not be empty".to_string(),
            ));
        }
        let size_policy =
            SizePolicy::from_request_fields(dto.size, dto.width.as_deref(), dto.height.as_deref())?;

        log::debug!("📝 Rendering {} bytes of Markdown", dto.content.len());
        Ok(ConversionRequest::html(&dto.title, &markdown_to_html(&dto))
            .with_size_policy(size_policy)
            .with_margin(dto.margin.unwrap_or_default()))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
