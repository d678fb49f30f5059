//! Threshold evaluation
//!
//! Files are assigned to every group whose pattern they match, each group's
//! coverage is the plain mean of its files' percentages, and groups are split
//! into passed and failed.

use serde::Serialize;
use tracing::debug;

use crate::threshold::ThresholdRegistry;

/// Measured coverage of one source file, as reported by the collector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileCoverage {
    pub path: String,
    pub percent_covered: f64,
}

impl FileCoverage {
    pub fn new(path: impl Into<String>, percent_covered: f64) -> Self {
        Self {
            path: path.into(),
            percent_covered,
        }
    }
}

/// A threshold group together with the files it matched
#[derive(Debug, Clone, Serialize)]
pub struct GroupMatch {
    pub pattern: String,
    pub threshold: f64,
    /// Unweighted mean of `files`' percentages
    pub coverage: f64,
    /// Contributing files, in input order
    pub files: Vec<FileCoverage>,
}

impl GroupMatch {
    pub fn passed(&self) -> bool {
        self.coverage >= self.threshold
    }
}

/// Passed/failed split of all groups that matched at least one file
#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationResult {
    pub passed: Vec<GroupMatch>,
    pub failed: Vec<GroupMatch>,
}

impl EvaluationResult {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.passed.is_empty() && self.failed.is_empty()
    }
}

/// Evaluate `files` against every group in `registry`.
///
/// Groups matching no file appear in neither list.
pub fn evaluate(files: &[FileCoverage], registry: &ThresholdRegistry) -> EvaluationResult {
    let mut result = EvaluationResult::default();

    for group in registry.groups() {
        let matched: Vec<FileCoverage> = files
            .iter()
            .filter(|f| group.matches(&f.path))
            .cloned()
            .collect();

        if matched.is_empty() {
            debug!(pattern = group.pattern(), "no files matched");
            continue;
        }

        let total: f64 = matched.iter().map(|f| f.percent_covered).sum();
        let coverage = total / matched.len() as f64;

        let group_match = GroupMatch {
            pattern: group.pattern().to_string(),
            threshold: group.threshold(),
            coverage,
            files: matched,
        };

        debug!(
            pattern = group.pattern(),
            files = group_match.files.len(),
            coverage,
            threshold = group.threshold(),
            "evaluated threshold group"
        );

        if group_match.passed() {
            result.passed.push(group_match);
        } else {
            result.failed.push(group_match);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(pairs: &[(&str, f64)]) -> ThresholdRegistry {
        ThresholdRegistry::from_pairs(pairs.iter().copied()).unwrap()
    }

    fn sample_files() -> Vec<FileCoverage> {
        vec![FileCoverage::new("a/x.py", 90.0), FileCoverage::new("a/y.py", 70.0)]
    }

    #[test]
    fn test_mean_equal_to_threshold_passes() {
        let result = evaluate(&sample_files(), &registry(&[("a/.*", 80.0)]));

        assert_eq!(result.passed.len(), 1);
        assert!(result.failed.is_empty());
        assert!((result.passed[0].coverage - 80.0).abs() < 0.01);
    }

    #[test]
    fn test_mean_below_threshold_fails() {
        let result = evaluate(&sample_files(), &registry(&[("a/.*", 81.0)]));

        assert!(result.passed.is_empty());
        assert_eq!(result.failed.len(), 1);
        assert!(result.has_failures());
        assert_eq!(result.failed[0].pattern, "a/.*");
        assert_eq!(result.failed[0].threshold, 81.0);
    }

    #[test]
    fn test_unmatched_group_is_omitted() {
        let files = vec![FileCoverage::new("a/x.py", 10.0)];
        let result = evaluate(&files, &registry(&[("z/.*", 50.0)]));

        assert!(result.is_empty());
        assert!(!result.has_failures());
    }

    #[test]
    fn test_file_counts_toward_every_matching_group() {
        let files = vec![
            FileCoverage::new("src/core/a.rs", 100.0),
            FileCoverage::new("src/core/b.rs", 50.0),
            FileCoverage::new("src/util.rs", 20.0),
        ];
        let result = evaluate(&files, &registry(&[("src/.*", 50.0), ("src/core/.*", 80.0)]));

        assert_eq!(result.passed.len(), 1);
        assert_eq!(result.passed[0].pattern, "src/.*");
        assert_eq!(result.passed[0].files.len(), 3);
        assert!((result.passed[0].coverage - 56.666).abs() < 0.01);

        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].pattern, "src/core/.*");
        assert!((result.failed[0].coverage - 75.0).abs() < 0.01);
    }

    #[test]
    fn test_mean_is_unweighted() {
        // A tiny fully-covered file weighs as much as a large uncovered one
        let files = vec![FileCoverage::new("a/tiny.py", 100.0), FileCoverage::new("a/huge.py", 0.0)];
        let result = evaluate(&files, &registry(&[("a/.*", 50.0)]));

        assert_eq!(result.passed.len(), 1);
        assert!((result.passed[0].coverage - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_order_follows_registry_and_input() {
        let files = vec![
            FileCoverage::new("b/2.py", 10.0),
            FileCoverage::new("a/1.py", 10.0),
            FileCoverage::new("b/1.py", 10.0),
        ];
        let result = evaluate(&files, &registry(&[("b/.*", 90.0), ("a/.*", 90.0)]));

        let patterns: Vec<&str> = result.failed.iter().map(|g| g.pattern.as_str()).collect();
        assert_eq!(patterns, vec!["b/.*", "a/.*"]);

        let paths: Vec<&str> = result.failed[0].files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["b/2.py", "b/1.py"]);
    }

    #[test]
    fn test_identical_aggregates_stay_separate() {
        let files = vec![FileCoverage::new("a/x.py", 60.0), FileCoverage::new("b/x.py", 60.0)];
        let result = evaluate(&files, &registry(&[("a/.*", 50.0), ("b/.*", 50.0)]));

        assert_eq!(result.passed.len(), 2);
    }

    #[test]
    fn test_group_count_invariant() {
        let files = vec![
            FileCoverage::new("a/x.py", 40.0),
            FileCoverage::new("b/x.py", 90.0),
            FileCoverage::new("c/x.py", 70.0),
        ];
        let reg = registry(&[("a/.*", 50.0), ("b/.*", 50.0), ("c/.*", 75.0), ("d/.*", 10.0)]);
        let result = evaluate(&files, &reg);

        assert_eq!(result.passed.len() + result.failed.len(), 3);
    }

    #[test]
    fn test_empty_registry_yields_empty_result() {
        let result = evaluate(&sample_files(), &ThresholdRegistry::default());
        assert!(result.is_empty());
    }
}
