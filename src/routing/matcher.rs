//! Route matching logic.
//!
//! # Responsibilities
//! - Match path prefix (case-sensitive)
//! - Report match strength so the router can prefer the longest prefix
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Plain string prefix: "/users" also matches "/users-archive"
//! - No regex to guarantee O(n) matching

/// Matches the request path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The configured prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the matched length when `path` starts with the prefix.
    pub fn match_len(&self, path: &str) -> Option<usize> {
        path.starts_with(&self.prefix).then_some(self.prefix.len())
    }
}
