//! Plain-text threshold summaries

use colored::Colorize;
use std::fmt::Write as _;
use std::io::{self, Write};

use crate::aggregate::{EvaluationResult, GroupMatch};

/// Which blocks get highlighted when written to a terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportStyle {
    pub emphasize_failures: bool,
    pub emphasize_passes: bool,
}

impl ReportStyle {
    pub fn plain() -> Self {
        Self {
            emphasize_failures: false,
            emphasize_passes: false,
        }
    }
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self {
            emphasize_failures: true,
            emphasize_passes: true,
        }
    }
}

/// Summary text for failed and passed groups; a block is absent when its list is empty
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormattedReport {
    pub failed: Option<String>,
    pub passed: Option<String>,
}

impl FormattedReport {
    pub fn is_empty(&self) -> bool {
        self.failed.is_none() && self.passed.is_none()
    }
}

pub fn format_report(result: &EvaluationResult) -> FormattedReport {
    FormattedReport {
        failed: format_block("Failed thresholds:", &result.failed, format_failed_group),
        passed: format_block("Passed thresholds:", &result.passed, format_passed_group),
    }
}

/// Write both blocks to `out`, failures first.
pub fn write_report(out: &mut impl Write, report: &FormattedReport, style: ReportStyle) -> io::Result<()> {
    if let Some(ref failed) = report.failed {
        if style.emphasize_failures {
            writeln!(out, "\n{}", failed.red().bold())?;
        } else {
            writeln!(out, "\n{}", failed)?;
        }
    }

    if let Some(ref passed) = report.passed {
        if style.emphasize_passes {
            writeln!(out, "\n{}", passed.green())?;
        } else {
            writeln!(out, "\n{}", passed)?;
        }
    }

    Ok(())
}

fn format_block(
    header: &str,
    groups: &[GroupMatch],
    format_group: fn(&GroupMatch) -> String,
) -> Option<String> {
    if groups.is_empty() {
        return None;
    }

    let mut block = String::from(header);
    for group in groups {
        block.push('\n');
        block.push_str(&format_group(group));
    }
    Some(block)
}

fn format_failed_group(group: &GroupMatch) -> String {
    let mut text = format!(
        "FAIL Required test coverage of {}% for {} not reached. coverage: {:.2}%:",
        group.threshold, group.pattern, group.coverage
    );
    push_files(&mut text, group);
    text
}

fn format_passed_group(group: &GroupMatch) -> String {
    let mut text = format!(
        "Required test coverage of {}% for {} reached. Total coverage: {:.2}%",
        group.threshold, group.pattern, group.coverage
    );
    push_files(&mut text, group);
    text
}

fn push_files(text: &mut String, group: &GroupMatch) {
    for file in &group.files {
        let _ = write!(text, "\n    {}: {:.2}%", file.path, file.percent_covered);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::FileCoverage;

    fn group(pattern: &str, threshold: f64, files: &[(&str, f64)]) -> GroupMatch {
        let files: Vec<FileCoverage> = files.iter().map(|(p, c)| FileCoverage::new(*p, *c)).collect();
        let coverage = files.iter().map(|f| f.percent_covered).sum::<f64>() / files.len() as f64;
        GroupMatch {
            pattern: pattern.to_string(),
            threshold,
            coverage,
            files,
        }
    }

    #[test]
    fn test_failed_block() {
        let result = EvaluationResult {
            passed: vec![],
            failed: vec![group("a/.*", 81.0, &[("a/x.py", 90.0), ("a/y.py", 70.0)])],
        };

        let report = format_report(&result);
        assert!(report.passed.is_none());
        assert_eq!(
            report.failed.as_deref(),
            Some(
                "Failed thresholds:\n\
                 FAIL Required test coverage of 81% for a/.* not reached. coverage: 80.00%:\n    \
                 a/x.py: 90.00%\n    \
                 a/y.py: 70.00%"
            )
        );
    }

    #[test]
    fn test_passed_block() {
        let result = EvaluationResult {
            passed: vec![group("src/.*", 72.5, &[("src/lib.rs", 100.0 / 3.0)])],
            failed: vec![],
        };

        let report = format_report(&result);
        assert!(report.failed.is_none());
        assert_eq!(
            report.passed.as_deref(),
            Some(
                "Passed thresholds:\n\
                 Required test coverage of 72.5% for src/.* reached. Total coverage: 33.33%\n    \
                 src/lib.rs: 33.33%"
            )
        );
    }

    #[test]
    fn test_groups_keep_their_order() {
        let result = EvaluationResult {
            passed: vec![group("b/.*", 10.0, &[("b/1", 50.0)]), group("a/.*", 10.0, &[("a/1", 50.0)])],
            failed: vec![],
        };

        let passed = format_report(&result).passed.unwrap();
        let b = passed.find("for b/.*").unwrap();
        let a = passed.find("for a/.*").unwrap();
        assert!(b < a);
    }

    #[test]
    fn test_empty_result_has_no_blocks() {
        let report = format_report(&EvaluationResult::default());
        assert!(report.is_empty());

        let mut out = Vec::new();
        write_report(&mut out, &report, ReportStyle::default()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_write_plain() {
        let report = FormattedReport {
            failed: Some("Failed thresholds:\nFAIL x".to_string()),
            passed: Some("Passed thresholds:\ny".to_string()),
        };

        let mut out = Vec::new();
        write_report(&mut out, &report, ReportStyle::plain()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\nFailed thresholds:\nFAIL x\n\nPassed thresholds:\ny\n"
        );
    }
}
