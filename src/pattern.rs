//! Path pattern matching for threshold groups
//!
//! Patterns are regular expressions anchored at the start of the relative
//! file path. A pattern only has to match a prefix of the path: `src/core`
//! selects `src/core/mod.rs` but not `lib/src/core/mod.rs`.

use regex::Regex;

use crate::error::ConfigurationError;

/// A compiled, start-anchored path pattern
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    pattern: String,
    regex: Regex,
}

impl PatternMatcher {
    /// Compile `pattern`, failing on invalid regex syntax.
    pub fn new(pattern: &str) -> Result<Self, ConfigurationError> {
        let regex = Regex::new(pattern).map_err(|source| {
            ConfigurationError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// True if the pattern matches starting at the first byte of `path`.
    ///
    /// The search is leftmost-first, so a match at position 0 is found
    /// whenever one exists.
    pub fn matches(&self, path: &str) -> bool {
        self.regex.find(path).is_some_and(|m| m.start() == 0)
    }
}

/// One-shot match of `path` against `pattern`
pub fn matches(pattern: &str, path: &str) -> Result<bool, ConfigurationError> {
    Ok(PatternMatcher::new(pattern)?.matches(path))
}
