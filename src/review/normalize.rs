//! Text normalization for review input
//!
//! Folds full-width ASCII forms to half-width and unifies dash, tilde,
//! quote and space variants. Every mapping is one character to one
//! character, so the resolver can fold document text in place without
//! disturbing its offset-to-position table.

/// Offset between the full-width forms block and ASCII
const FULLWIDTH_OFFSET: u32 = 0xFEE0;

/// Map a single character to its normalized form
pub fn normalize_char(c: char) -> char {
    match c {
        // Full-width ASCII variants (U+FF01..=U+FF5E)
        '\u{FF01}'..='\u{FF5E}' => {
            char::from_u32(c as u32 - FULLWIDTH_OFFSET).unwrap_or(c)
        }
        // Ideographic space
        '\u{3000}' => ' ',
        // Hyphens, dashes and minus signs
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}'
        | '\u{2212}' | '\u{FE63}' => '-',
        // Wave dashes and tilde variants
        '\u{301C}' | '\u{3030}' | '\u{2053}' | '\u{223C}' => '~',
        // Curly quotes
        '\u{2018}' | '\u{2019}' => '\'',
        '\u{201C}' | '\u{201D}' => '"',
        _ => c,
    }
}

/// Normalize a whole string
pub fn normalize(text: &str) -> String {
    text.chars().map(normalize_char).collect()
}
