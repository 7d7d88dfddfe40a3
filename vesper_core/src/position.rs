//! Source position tracking for error reporting.
//!
//! A position is a line number plus the text of that line. The generator
//! engine retains the last position an error crossed a suspension boundary
//! at, so that a later error raised on an already-completed generator can
//! still report where execution was when it failed.

use std::fmt;
use std::sync::Arc;

/// A line-level source location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourcePosition {
    /// One-based line number.
    pub line: u32,
    /// Text of the source line, when available.
    pub line_source: Option<Arc<str>>,
}

impl SourcePosition {
    /// Creates a position with a line number only.
    #[must_use]
    pub const fn line(line: u32) -> Self {
        Self {
            line,
            line_source: None,
        }
    }

    /// Creates a position with a line number and line text.
    #[must_use]
    pub fn with_source(line: u32, source: impl AsRef<str>) -> Self {
        Self {
            line,
            line_source: Some(Arc::from(source.as_ref())),
        }
    }

    /// Returns true if no line information is attached.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        self.line == 0
    }
}

impl Default for SourcePosition {
    #[inline]
    fn default() -> Self {
        Self::line(0)
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.line_source {
            Some(src) => write!(f, "line {}: {}", self.line, src),
            None => write!(f, "line {}", self.line),
        }
    }
}
