//! Coverage collectors: where per-file percentages come from

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

use super::{parse_coverage, CoverageFormat, CoverageMetric};
use crate::aggregate::FileCoverage;
use crate::error::CollectorError;

/// Source of per-file coverage for a finished run
pub trait CoverageCollector {
    /// True when collection is switched off or produced nothing to read.
    fn is_disabled(&self) -> bool;

    /// One entry per analyzed source file, in report order.
    fn file_coverage(&self) -> Result<Vec<FileCoverage>, CollectorError>;
}

/// Reads a coverage report written by an external tool
#[derive(Debug, Clone)]
pub struct ReportCollector {
    report: PathBuf,
    format: CoverageFormat,
    metric: CoverageMetric,
    root: PathBuf,
    disabled: bool,
    written_after: Option<SystemTime>,
}

impl ReportCollector {
    pub fn new(report: impl Into<PathBuf>, format: CoverageFormat) -> Self {
        Self {
            report: report.into(),
            format,
            metric: CoverageMetric::default(),
            root: PathBuf::new(),
            disabled: false,
            written_after: None,
        }
    }

    pub fn with_metric(mut self, metric: CoverageMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Absolute report paths under `root` are reported relative to it.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Ignore a report last modified before `since`, e.g. one left over from
    /// an earlier run when the test command wrote none.
    pub fn written_after(mut self, since: SystemTime) -> Self {
        self.written_after = Some(since);
        self
    }

    fn is_stale(&self) -> bool {
        let Some(since) = self.written_after else {
            return false;
        };
        // Compared in whole seconds; some filesystems store coarse mtimes.
        match fs::metadata(&self.report).and_then(|m| m.modified()) {
            Ok(modified) => epoch_secs(modified) < epoch_secs(since),
            Err(_) => false,
        }
    }
}

impl CoverageCollector for ReportCollector {
    fn is_disabled(&self) -> bool {
        if self.disabled {
            debug!("coverage collection disabled");
            return true;
        }
        if !self.report.exists() {
            warn!(
                report = %self.report.display(),
                "coverage report not found, skipping threshold checks"
            );
            return true;
        }
        if self.is_stale() {
            warn!(
                report = %self.report.display(),
                "coverage report predates this run, skipping threshold checks"
            );
            return true;
        }
        false
    }

    fn file_coverage(&self) -> Result<Vec<FileCoverage>, CollectorError> {
        let data = parse_coverage(&self.report, self.format)?;
        debug!(
            report = %self.report.display(),
            files = data.files.len(),
            "read coverage report"
        );

        Ok(data
            .files
            .iter()
            .map(|stats| {
                FileCoverage::new(relative_path(&stats.path, &self.root), stats.percent(self.metric))
            })
            .collect())
    }
}

fn epoch_secs(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

/// `path` relative to `root` when it lies beneath it, with `/` separators
pub fn relative_path(path: &str, root: &Path) -> String {
    let as_path = Path::new(path);
    let relative = if as_path.is_absolute() && !root.as_os_str().is_empty() {
        as_path.strip_prefix(root).unwrap_or(as_path)
    } else {
        as_path
    };

    let relative = relative.to_string_lossy().replace('\\', "/");
    relative
        .strip_prefix("./")
        .map(str::to_string)
        .unwrap_or(relative)
}
