//! Threshold groups: the declared pattern -> required percentage rules

use tracing::warn;

use crate::error::ConfigurationError;
use crate::pattern::PatternMatcher;

/// A pattern together with the coverage its files must reach on average
#[derive(Debug, Clone)]
pub struct ThresholdGroup {
    matcher: PatternMatcher,
    threshold: f64,
}

impl ThresholdGroup {
    pub fn new(pattern: &str, threshold: f64) -> Result<Self, ConfigurationError> {
        if !threshold.is_finite() {
            return Err(ConfigurationError::InvalidThreshold {
                pattern: pattern.to_string(),
                value: threshold.to_string(),
            });
        }
        if !(0.0..=100.0).contains(&threshold) {
            warn!(pattern, threshold, "threshold outside 0-100%");
        }

        Ok(Self {
            matcher: PatternMatcher::new(pattern)?,
            threshold,
        })
    }

    pub fn pattern(&self) -> &str {
        self.matcher.pattern()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }
}

/// Ordered set of threshold groups, keyed by pattern
///
/// Iteration follows the order patterns were first declared. Declaring the
/// same pattern twice keeps its first position and the last threshold.
#[derive(Debug, Clone, Default)]
pub struct ThresholdRegistry {
    groups: Vec<ThresholdGroup>,
}

impl ThresholdRegistry {
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut groups: Vec<ThresholdGroup> = Vec::new();

        for (pattern, threshold) in pairs {
            let group = ThresholdGroup::new(pattern.as_ref(), threshold)?;
            match groups.iter_mut().find(|g| g.pattern() == group.pattern()) {
                Some(existing) => *existing = group,
                None => groups.push(group),
            }
        }

        Ok(Self { groups })
    }

    /// No groups means nothing is enforced.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn groups(&self) -> &[ThresholdGroup] {
        &self.groups
    }
}
