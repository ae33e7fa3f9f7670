//! FILENAME: parser/src/span.rs
//! PURPOSE: Half-open source offset ranges attached to tokens and errors.
//! CONTEXT: Offsets count characters (code points) consumed by the tokenizer,
//! not bytes. Use `source_text` to recover the slice a span covers.

use serde::{Deserialize, Serialize};

/// A `[start, end)` range of character offsets into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub const fn len(self) -> usize {
        self.end - self.start
    }

    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Returns the characters of `source` covered by this span.
    /// Out-of-range offsets are clamped to the end of the source.
    pub fn source_text(self, source: &str) -> String {
        source
            .chars()
            .skip(self.start)
            .take(self.end.saturating_sub(self.start))
            .collect()
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
