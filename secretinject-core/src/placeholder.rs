//! Placeholder grammar.
//!
//! A placeholder is a key wrapped in an open and a close marker, `<key>` by
//! default. The key is taken verbatim: no trimming, no escapes, and no
//! validation. Whether a key exists is decided by the resolver, never here.
//!
//! Markers do not nest. When a second open marker shows up before the close
//! marker, the candidate restarts there, so `a<b<c>` holds the single
//! placeholder `<c>`. A key never spans a line break.

use std::ops::Range;

/// Markers delimiting a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderSyntax {
    pub open: char,
    pub close: char,
}

impl Default for PlaceholderSyntax {
    fn default() -> Self {
        Self {
            open: '<',
            close: '>',
        }
    }
}

/// One placeholder occurrence inside a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// Lookup key, the text between the markers.
    pub key: &'a str,
    /// Byte range of the occurrence in the scanned string, markers included.
    pub span: Range<usize>,
}

impl Placeholder<'_> {
    /// True when the occurrence covers all of `s`.
    pub fn is_whole(&self, s: &str) -> bool {
        self.span.start == 0 && self.span.end == s.len()
    }
}

impl PlaceholderSyntax {
    pub fn new(open: char, close: char) -> Self {
        Self { open, close }
    }

    /// Returns the placeholder occurrences of `s`, left to right.
    pub fn scan<'a>(&self, s: &'a str) -> Vec<Placeholder<'a>> {
        let mut found = Vec::new();
        let mut start: Option<usize> = None;

        for (i, c) in s.char_indices() {
            // Close is checked first so identical markers (`%key%`) pair up.
            if c == self.close && start.is_some() {
                if let Some(open_at) = start.take() {
                    found.push(Placeholder {
                        key: &s[open_at + self.open.len_utf8()..i],
                        span: open_at..i + c.len_utf8(),
                    });
                }
            } else if c == self.open {
                start = Some(i);
            } else if c == '\n' {
                start = None;
            }
        }

        found
    }

    /// Wraps `key` in the markers.
    pub fn format(&self, key: &str) -> String {
        format!("{}{}{}", self.open, key, self.close)
    }
}
