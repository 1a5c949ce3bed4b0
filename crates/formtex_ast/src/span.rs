//! Source span type for diagnostics.
//!
//! Byte offsets into the original formula text, so a span can slice the
//! input directly. UIs that index by character can convert with
//! [`Span::char_range`].

use serde::{Deserialize, Serialize};

/// Source location span (byte offsets), the range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Span covering the single character that starts at byte `index` of `text`.
    ///
    /// Falls back to an empty span at `index` when `index` is past the end.
    pub fn char_at(text: &str, index: usize) -> Self {
        let width = text[index.min(text.len())..]
            .chars()
            .next()
            .map_or(0, char::len_utf8);
        Self::new(index, index + width)
    }

    /// Span covering all of `text`.
    pub fn whole(text: &str) -> Self {
        Self::new(0, text.len())
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// The highlighted substring, or `None` if the span does not fall on
    /// character boundaries of `text`.
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.start..self.end)
    }

    /// Convert to a `(start, end)` pair of character indices into `text`.
    pub fn char_range(&self, text: &str) -> (usize, usize) {
        let to_chars = |byte: usize| text[..byte.min(text.len())].chars().count();
        (to_chars(self.start), to_chars(self.end))
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
