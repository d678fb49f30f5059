//! End-of-run threshold enforcement
//!
//! The controller is handed its registry and collector up front. At the end
//! of a run it evaluates coverage and decides the final exit status.

use tracing::{debug, info};

use crate::aggregate::{evaluate, EvaluationResult};
use crate::coverage::CoverageCollector;
use crate::error::CollectorError;
use crate::report::{format_report, FormattedReport};
use crate::threshold::ThresholdRegistry;

/// Exit status used when thresholds fail an otherwise successful run
pub const THRESHOLD_FAILURE_EXIT_CODE: i32 = 1;

/// What happened at the end of a session
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub exit_status: i32,
    /// `None` when evaluation was skipped
    pub result: Option<EvaluationResult>,
}

impl SessionOutcome {
    fn skipped(exit_status: i32) -> Self {
        Self {
            exit_status,
            result: None,
        }
    }

    pub fn report(&self) -> Option<FormattedReport> {
        self.result.as_ref().map(format_report)
    }
}

pub struct SessionController<C> {
    registry: ThresholdRegistry,
    collector: C,
}

impl<C: CoverageCollector> SessionController<C> {
    pub fn new(registry: ThresholdRegistry, collector: C) -> Self {
        Self { registry, collector }
    }

    /// Evaluate thresholds for a run that ended with `exit_status`.
    ///
    /// A failing group only turns a successful status into a failure; a run
    /// that already failed keeps its own status.
    pub fn finish(&self, exit_status: i32) -> Result<SessionOutcome, CollectorError> {
        if self.registry.is_empty() {
            debug!("no thresholds configured");
            return Ok(SessionOutcome::skipped(exit_status));
        }

        if self.collector.is_disabled() {
            return Ok(SessionOutcome::skipped(exit_status));
        }

        let files = self.collector.file_coverage()?;
        let result = evaluate(&files, &self.registry);

        let exit_status = if result.has_failures() && exit_status == 0 {
            info!(
                failed = result.failed.len(),
                "coverage thresholds not reached, failing the run"
            );
            THRESHOLD_FAILURE_EXIT_CODE
        } else {
            exit_status
        };

        Ok(SessionOutcome {
            exit_status,
            result: Some(result),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::FileCoverage;
    use std::cell::Cell;

    struct FakeCollector {
        disabled: bool,
        files: Vec<FileCoverage>,
        reads: Cell<usize>,
    }

    impl FakeCollector {
        fn new(files: &[(&str, f64)]) -> Self {
            Self {
                disabled: false,
                files: files.iter().map(|(p, c)| FileCoverage::new(*p, *c)).collect(),
                reads: Cell::new(0),
            }
        }
    }

    impl CoverageCollector for FakeCollector {
        fn is_disabled(&self) -> bool {
            self.disabled
        }

        fn file_coverage(&self) -> Result<Vec<FileCoverage>, CollectorError> {
            self.reads.set(self.reads.get() + 1);
            Ok(self.files.clone())
        }
    }

    struct BrokenCollector;

    impl CoverageCollector for BrokenCollector {
        fn is_disabled(&self) -> bool {
            false
        }

        fn file_coverage(&self) -> Result<Vec<FileCoverage>, CollectorError> {
            Err(CollectorError::Parse {
                path: "coverage.xml".into(),
                message: "bad".to_string(),
            })
        }
    }

    fn session(config: &[(&str, f64)], files: &[(&str, f64)]) -> SessionController<FakeCollector> {
        let registry = ThresholdRegistry::from_pairs(config.iter().copied()).unwrap();
        SessionController::new(registry, FakeCollector::new(files))
    }

    const FILES: &[(&str, f64)] = &[("a/x.py", 90.0), ("a/y.py", 70.0)];

    #[test]
    fn test_threshold_reached_keeps_success() {
        let outcome = session(&[("a/.*", 80.0)], FILES).finish(0).unwrap();

        assert_eq!(outcome.exit_status, 0);
        let result = outcome.result.unwrap();
        assert_eq!(result.passed.len(), 1);
        assert!(result.failed.is_empty());
    }

    #[test]
    fn test_threshold_missed_fails_run() {
        let outcome = session(&[("a/.*", 81.0)], FILES).finish(0).unwrap();

        assert_eq!(outcome.exit_status, THRESHOLD_FAILURE_EXIT_CODE);
        assert_eq!(outcome.result.unwrap().failed.len(), 1);
    }

    #[test]
    fn test_existing_failure_is_kept() {
        let outcome = session(&[("a/.*", 81.0)], FILES).finish(101).unwrap();
        assert_eq!(outcome.exit_status, 101);

        let outcome = session(&[("a/.*", 10.0)], FILES).finish(2).unwrap();
        assert_eq!(outcome.exit_status, 2);
    }

    #[test]
    fn test_unmatched_pattern_leaves_status() {
        let outcome = session(&[("z/.*", 50.0)], &[("a/x.py", 10.0)]).finish(0).unwrap();

        assert_eq!(outcome.exit_status, 0);
        assert_eq!(outcome.report(), Some(FormattedReport::default()));
        let result = outcome.result.unwrap();
        assert!(result.passed.is_empty());
        assert!(result.failed.is_empty());
    }

    #[test]
    fn test_empty_config_skips_collection() {
        let controller = session(&[], &[("a/x.py", 0.0)]);
        let outcome = controller.finish(0).unwrap();

        assert_eq!(outcome.exit_status, 0);
        assert!(outcome.result.is_none());
        assert!(outcome.report().is_none());
        assert_eq!(controller.collector.reads.get(), 0);
    }

    #[test]
    fn test_disabled_collector_skips_evaluation() {
        let registry = ThresholdRegistry::from_pairs([("a/.*", 100.0)]).unwrap();
        let mut collector = FakeCollector::new(&[("a/x.py", 0.0)]);
        collector.disabled = true;
        let controller = SessionController::new(registry, collector);

        let outcome = controller.finish(0).unwrap();
        assert_eq!(outcome.exit_status, 0);
        assert!(outcome.result.is_none());
        assert_eq!(controller.collector.reads.get(), 0);
    }

    #[test]
    fn test_collector_error_propagates() {
        let registry = ThresholdRegistry::from_pairs([("a/.*", 50.0)]).unwrap();
        let controller = SessionController::new(registry, BrokenCollector);
        assert!(controller.finish(0).is_err());
    }

    #[test]
    fn test_report_from_outcome() {
        let outcome = session(&[("a/.*", 81.0)], FILES).finish(0).unwrap();
        let report = outcome.report().unwrap();

        assert!(report.failed.unwrap().starts_with("Failed thresholds:"));
        assert!(report.passed.is_none());
    }
}
