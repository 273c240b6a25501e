//! Text escaping, markdown rendering, and the highlighted text layer.

use crate::highlight::{mark_segment, HighlightFragment, MarkedPiece, TextSegment};
use crate::models::{ChatMessage, RenderedMessage, RenderedPage, RenderedSegment};
use pulldown_cmark::{Options, Parser};

// ============================================================================
// Text Escaping
// ============================================================================

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// ============================================================================
// Markdown Rendering
// ============================================================================

pub fn render_markdown(content: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(content, options);
    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, parser);
    // Backend output is untrusted; strip raw HTML and scripts
    ammonia::clean(&html_output)
}

pub fn render_message(message: &ChatMessage) -> RenderedMessage {
    RenderedMessage {
        role: message.role,
        content: message.content.clone(),
        content_html: render_markdown(&message.content),
    }
}

// ============================================================================
// Highlighted Text Layer
// ============================================================================

/// Escapes every piece and wraps emphasized ones in `<mark>`.
pub fn render_marked_html(pieces: &[MarkedPiece]) -> String {
    let mut html = String::new();
    for piece in pieces {
        if piece.emphasized {
            html.push_str("<mark class=\"hl\">");
            html.push_str(&html_escape(&piece.text));
            html.push_str("</mark>");
        } else {
            html.push_str(&html_escape(&piece.text));
        }
    }
    html
}

/// One render pass over a document. `fragments` is the snapshot taken when
/// the pass started and is used for every segment.
pub fn render_pages(pages: &[Vec<TextSegment>], fragments: &[HighlightFragment]) -> Vec<RenderedPage> {
    pages
        .iter()
        .enumerate()
        .map(|(i, segments)| RenderedPage {
            page: (i + 1) as u32,
            segments: segments
                .iter()
                .map(|segment| RenderedSegment {
                    pieces: mark_segment(segment, fragments),
                })
                .collect(),
        })
        .collect()
}

pub fn render_pages_html(pages: &[RenderedPage]) -> String {
    if pages.is_empty() {
        return "<p class=\"muted\">No text could be extracted from this PDF.</p>".to_string();
    }

    let mut html = String::new();
    for page in pages {
        html.push_str(&format!(
            r#"<section class="text-page" id="page-{n}"><div class="page-label">Page {n}</div>"#,
            n = page.page
        ));
        for segment in &page.segments {
            html.push_str("<div class=\"line\">");
            html.push_str(&render_marked_html(&segment.pieces));
            html.push_str("</div>");
        }
        html.push_str("</section>");
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatRole;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_render_markdown_sanitizes() {
        let html = render_markdown("# Title\n\n**bold** <script>alert(1)</script>");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_render_message() {
        let rendered = render_message(&ChatMessage::assistant("*yes*"));
        assert_eq!(rendered.role, ChatRole::Assistant);
        assert_eq!(rendered.content, "*yes*");
        assert!(rendered.content_html.contains("<em>yes</em>"));
    }

    #[test]
    fn test_render_marked_html_escapes_pieces() {
        let pieces = vec![
            MarkedPiece {
                text: "a < b ".to_string(),
                emphasized: false,
            },
            MarkedPiece {
                text: "& c".to_string(),
                emphasized: true,
            },
        ];
        assert_eq!(
            render_marked_html(&pieces),
            "a &lt; b <mark class=\"hl\">&amp; c</mark>"
        );
    }

    #[test]
    fn test_render_pages_marks_matching_lines_only() {
        let pages = vec![
            vec![
                TextSegment::new(1, "Deep Residual Learning"),
                TextSegment::new(1, "for image recognition"),
            ],
            vec![TextSegment::new(2, "residual blocks again")],
        ];
        let fragments = vec![HighlightFragment::new(1, "residual").unwrap()];
        let rendered = render_pages(&pages, &fragments);

        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[1].page, 2);
        let html = render_pages_html(&rendered);
        assert!(html.contains("Deep <mark class=\"hl\">Residual</mark> Learning"));
        assert!(html.contains("<div class=\"line\">for image recognition</div>"));
        // same text on page 2, but the fragment belongs to page 1
        assert!(html.contains("<div class=\"line\">residual blocks again</div>"));
    }

    #[test]
    fn test_render_pages_html_empty() {
        assert!(render_pages_html(&[]).contains("No text could be extracted"));
    }
}
