//! covgate - per-path coverage thresholds
//!
//! Enforces minimum coverage for groups of files after a test run:
//! - Groups selected by start-anchored regex patterns from `.threshold.json`
//! - Group coverage is the unweighted mean of its files' percentages
//! - LCOV and Cobertura reports as the coverage source
//! - A failing group turns a successful run into a failed one

pub mod aggregate;
pub mod config;
pub mod coverage;
pub mod error;
pub mod pattern;
pub mod report;
pub mod runner;
pub mod session;
pub mod telemetry;
pub mod threshold;

pub use aggregate::{evaluate, EvaluationResult, FileCoverage, GroupMatch};
pub use config::{load_thresholds, DEFAULT_THRESHOLD_CONFIG};
pub use coverage::{CoverageCollector, CoverageFormat, CoverageMetric, ReportCollector};
pub use error::{CollectorError, CommandError, ConfigurationError};
pub use pattern::PatternMatcher;
pub use report::{format_report, write_report, FormattedReport, ReportStyle};
pub use session::{SessionController, SessionOutcome, THRESHOLD_FAILURE_EXIT_CODE};
pub use threshold::{ThresholdGroup, ThresholdRegistry};
