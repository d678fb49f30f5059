//! Coverage module
//!
//! Provides:
//! - LCOV parsing
//! - Cobertura XML parsing
//! - The collector that turns a report into per-file percentages

mod cobertura;
mod collector;
mod lcov;

pub use cobertura::*;
pub use collector::*;
pub use lcov::*;

use clap::ValueEnum;
use std::path::Path;

use crate::error::CollectorError;

/// Report formats understood by the collector
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CoverageFormat {
    Lcov,
    Cobertura,
}

/// How a file's percentage is derived from its raw counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CoverageMetric {
    /// Covered lines over measured lines
    #[default]
    Line,
    /// Taken branches over measured branches
    Branch,
    /// Lines and branches counted together
    Combined,
}

/// Raw per-file counts from a coverage report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileStats {
    pub path: String,
    pub lines_covered: u32,
    pub lines_total: u32,
    pub branches_covered: u32,
    pub branches_total: u32,
}

impl FileStats {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Percentage covered under `metric`. Nothing measured counts as fully covered.
    pub fn percent(&self, metric: CoverageMetric) -> f64 {
        let (covered, total) = match metric {
            CoverageMetric::Line => (self.lines_covered, self.lines_total),
            CoverageMetric::Branch => (self.branches_covered, self.branches_total),
            CoverageMetric::Combined => (
                self.lines_covered + self.branches_covered,
                self.lines_total + self.branches_total,
            ),
        };

        if total == 0 {
            return 100.0;
        }
        (covered as f64 / total as f64) * 100.0
    }

    fn merge(&mut self, other: &FileStats) {
        self.lines_covered += other.lines_covered;
        self.lines_total += other.lines_total;
        self.branches_covered += other.branches_covered;
        self.branches_total += other.branches_total;
    }
}

/// Per-file data from any report format, in report order
#[derive(Debug, Clone, Default)]
pub struct CoverageData {
    pub files: Vec<FileStats>,
}

impl CoverageData {
    /// Add `stats`, merging into an earlier entry for the same path.
    fn push(&mut self, stats: FileStats) {
        match self.files.iter_mut().find(|f| f.path == stats.path) {
            Some(existing) => existing.merge(&stats),
            None => self.files.push(stats),
        }
    }
}

/// Parse coverage from a file based on format
pub fn parse_coverage(path: &Path, format: CoverageFormat) -> Result<CoverageData, CollectorError> {
    let content = std::fs::read_to_string(path).map_err(|source| CollectorError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed = match format {
        CoverageFormat::Lcov => Ok(parse_lcov_string(&content)),
        CoverageFormat::Cobertura => parse_cobertura_string(&content),
    };

    parsed.map_err(|message| CollectorError::Parse {
        path: path.to_path_buf(),
        message,
    })
}
