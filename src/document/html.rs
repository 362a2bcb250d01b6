//! HTML import and highlighted HTML export using lol_html
//!
//! Import flattens block-level elements into paragraphs. Export renders
//! each paragraph as a `<p>` with `<mark>` spans over highlighted ranges.

use std::cell::RefCell;
use std::rc::Rc;

use lol_html::{doc_text, element, rewrite_str, RewriteStrSettings};

use super::model::Document;
use super::DocumentError;
use crate::review::TextAnchor;

/// Elements that start a new paragraph
const BLOCK_SELECTOR: &str =
    "p, h1, h2, h3, h4, h5, h6, li, blockquote, pre, div, br, tr, dt, dd, figcaption";

/// Configuration for highlight rendering
#[derive(Debug, Clone)]
pub struct HighlightConfig {
    /// CSS class for review highlights
    pub highlight_class: String,
    /// CSS class for the focused selection
    pub selection_class: String,
    /// Data attribute carrying the highlighted range
    pub anchor_attribute: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            highlight_class: "tensaku-highlight".to_string(),
            selection_class: "tensaku-selection".to_string(),
            anchor_attribute: "data-anchor".to_string(),
        }
    }
}

/// Remove elements whose text is not document content
pub fn sanitize_html(html: &str) -> Result<String, DocumentError> {
    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("script, style, head, noscript, template", |el| {
                    el.remove();
                    Ok(())
                }),
                element!("*", |el| {
                    for attr in ["onclick", "onload", "onerror", "onmouseover"] {
                        el.remove_attribute(attr);
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| DocumentError::Html(e.to_string()))
}

/// Accumulates raw text chunks into paragraphs
#[derive(Default)]
struct ParagraphCollector {
    paragraphs: Vec<String>,
    current: String,
}

impl ParagraphCollector {
    fn push_text(&mut self, raw: &str) {
        self.current.push_str(raw);
    }

    fn break_block(&mut self) {
        let raw = std::mem::take(&mut self.current);
        let decoded = html_escape::decode_html_entities(&raw);
        let collapsed = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
        if !collapsed.is_empty() {
            self.paragraphs.push(collapsed);
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.break_block();
        self.paragraphs
    }
}

impl Document {
    /// Build a document from HTML, one paragraph per block element
    pub fn from_html(html: &str) -> Result<Self, DocumentError> {
        let cleaned = sanitize_html(html)?;
        let collector = Rc::new(RefCell::new(ParagraphCollector::default()));

        rewrite_str(
            &cleaned,
            RewriteStrSettings {
                element_content_handlers: vec![element!(BLOCK_SELECTOR, |el| {
                    collector.borrow_mut().break_block();
                    // Closing a block ends its paragraph too; void elements have no end tag
                    if let Some(handlers) = el.end_tag_handlers() {
                        let collector = Rc::clone(&collector);
                        handlers.push(Box::new(move |_end: &mut lol_html::html_content::EndTag<'_>| {
                            collector.borrow_mut().break_block();
                            Ok(())
                        }) as lol_html::EndTagHandler<'static>);
                    }
                    Ok(())
                })],
                document_content_handlers: vec![doc_text!(|t| {
                    collector.borrow_mut().push_text(t.as_str());
                    Ok(())
                })],
                ..RewriteStrSettings::default()
            },
        )
        .map_err(|e| DocumentError::Html(e.to_string()))?;

        let paragraphs = collector.take().finish();
        tracing::debug!(paragraphs = paragraphs.len(), "Imported HTML document");
        Ok(Self::from_paragraphs(paragraphs))
    }

    /// Render paragraphs as HTML with highlights and selection marked
    pub fn to_html(&self, config: &HighlightConfig) -> String {
        let mut out = String::new();

        for (index, paragraph) in self.paragraphs().iter().enumerate() {
            out.push_str("<p>");

            let mut run = String::new();
            let mut run_marks: Marks = Marks::default();
            for (offset, c) in paragraph.chars().enumerate() {
                let marks = match self.position_of(index, offset) {
                    Some(position) => self.marks_at(position),
                    None => Marks::default(),
                };
                if marks != run_marks && !run.is_empty() {
                    push_run(&mut out, &run, run_marks, config);
                    run.clear();
                }
                run_marks = marks;
                run.push(c);
            }
            if !run.is_empty() {
                push_run(&mut out, &run, run_marks, config);
            }

            out.push_str("</p>\n");
        }

        out
    }

    fn marks_at(&self, position: usize) -> Marks {
        Marks {
            highlight: self.highlights().iter().find(|a| a.contains(position)).copied(),
            selected: self.selection().map(|s| s.contains(position)).unwrap_or(false),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Marks {
    highlight: Option<TextAnchor>,
    selected: bool,
}

fn push_run(out: &mut String, text: &str, marks: Marks, config: &HighlightConfig) {
    let escaped = html_escape::encode_text(text);
    let mut inner = escaped.into_owned();

    if marks.selected {
        inner = format!("<span class=\"{}\">{}</span>", config.selection_class, inner);
    }
    if let Some(anchor) = marks.highlight {
        inner = format!(
            "<mark class=\"{}\" {}=\"{}-{}\">{}</mark>",
            config.highlight_class, config.anchor_attribute, anchor.start, anchor.end, inner
        );
    }
    out.push_str(&inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::{find_first, DocumentEditor};

    #[test]
    fn test_import_block_elements() {
        let html = "<html><head><title>T</title></head><body>\
                    <h1>Title</h1><p>First   paragraph\n with <b>bold</b> text.</p>\
                    <ul><li>one</li><li>two</li></ul></body></html>";
        let doc = Document::from_html(html).unwrap();
        assert_eq!(
            doc.paragraphs(),
            &[
                "Title".to_string(),
                "First paragraph with bold text.".to_string(),
                "one".to_string(),
                "two".to_string(),
            ]
        );
    }

    #[test]
    fn test_import_decodes_entities_and_drops_scripts() {
        let html = "<p>Fish &amp; chips &lt;3</p><script>alert('x')</script><p>after</p>";
        let doc = Document::from_html(html).unwrap();
        assert_eq!(
            doc.paragraphs(),
            &["Fish & chips <3".to_string(), "after".to_string()]
        );
    }

    #[test]
    fn test_import_text_after_closed_block() {
        let doc = Document::from_html("<h1>Title</h1>Intro text<p>Body</p>trailing").unwrap();
        assert_eq!(
            doc.paragraphs(),
            &[
                "Title".to_string(),
                "Intro text".to_string(),
                "Body".to_string(),
                "trailing".to_string(),
            ]
        );
        assert_eq!(find_first("Title", &doc.snapshot()), Some(TextAnchor::new(1, 6)));
    }

    #[test]
    fn test_import_nested_blocks() {
        let doc = Document::from_html("<div>Lead <p>inner</p> tail</div>").unwrap();
        assert_eq!(
            doc.paragraphs(),
            &["Lead".to_string(), "inner".to_string(), "tail".to_string()]
        );
    }

    #[test]
    fn test_import_br_splits_lines() {
        let doc = Document::from_html("<p>line one<br>line two</p>").unwrap();
        assert_eq!(doc.paragraphs().len(), 2);
    }

    #[test]
    fn test_export_marks_highlight() {
        let mut doc = Document::from_text("The foo bar is broken.");
        let anchor = find_first("foo bar", &doc.snapshot()).unwrap();
        doc.apply_highlight(anchor);

        let html = doc.to_html(&HighlightConfig::default());
        assert_eq!(
            html,
            "<p>The <mark class=\"tensaku-highlight\" data-anchor=\"5-12\">foo bar</mark> is broken.</p>\n"
        );
    }

    #[test]
    fn test_export_escapes_text() {
        let doc = Document::from_text("a < b & c");
        let html = doc.to_html(&HighlightConfig::default());
        assert_eq!(html, "<p>a &lt; b &amp; c</p>\n");
    }

    #[test]
    fn test_export_marks_selection() {
        let mut doc = Document::from_text("pick me");
        doc.set_selection(TextAnchor::new(6, 8));
        let html = doc.to_html(&HighlightConfig::default());
        assert!(html.contains("<span class=\"tensaku-selection\">me</span>"));
    }
}
