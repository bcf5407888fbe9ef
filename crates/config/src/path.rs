// Dot-path addressing into the settings tree
// "server.port" -> ["server", "port"]

use std::fmt;

/// An ordered sequence of key segments addressing a location in the
/// settings tree. Zero segments is the (valid) root path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    /// Parse a dot-separated path string.
    ///
    /// Splits on `.`, trims whitespace from each token, and drops tokens
    /// that trim to empty, preserving the order of the rest. A string of
    /// only dots or whitespace yields the root path.
    pub fn parse(raw: &str) -> Self {
        let segments = raw
            .split('.')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self(segments)
    }

    /// Build a path from already-split segments, used verbatim.
    /// No trimming or filtering is applied.
    pub fn from_segments(segments: Vec<String>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl From<&str> for KeyPath {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}
