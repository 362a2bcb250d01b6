//! Reviewable documents
//!
//! [`Document`] is the in-memory stand-in for the rich-text editor: it
//! implements [`DocumentEditor`](crate::review::DocumentEditor) over a
//! paragraph list and can be imported from and rendered to HTML.

mod html;
mod model;

pub use html::{sanitize_html, HighlightConfig};
pub use model::Document;

/// Document errors
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("HTML rewrite failed: {0}")]
    Html(String),

    #[error("Document too large: {0} characters (limit {1})")]
    TooLarge(usize, usize),
}
