//! LCOV format parser

use super::{CoverageData, FileStats};

/// Parse LCOV content from a string
///
/// `LF`/`LH`/`BRF`/`BRH` summary lines win; records without them fall back
/// to counting `DA` and `BRDA` entries.
pub fn parse_lcov_string(content: &str) -> CoverageData {
    let mut data = CoverageData::default();

    let mut current: Option<FileStats> = None;
    let mut da_total = 0u32;
    let mut da_hit = 0u32;
    let mut brda_total = 0u32;
    let mut brda_hit = 0u32;
    let mut has_line_summary = false;
    let mut has_branch_summary = false;

    for line in content.lines() {
        let line = line.trim();

        if let Some(path) = line.strip_prefix("SF:") {
            // Source file start
            current = Some(FileStats::new(path));
            da_total = 0;
            da_hit = 0;
            brda_total = 0;
            brda_hit = 0;
            has_line_summary = false;
            has_branch_summary = false;
            continue;
        }

        let Some(file) = current.as_mut() else {
            continue;
        };

        if let Some(rest) = line.strip_prefix("DA:") {
            // DA:<line>,<hits>[,<checksum>]
            da_total += 1;
            if let Some(hits) = rest.split(',').nth(1) {
                if hits.parse::<u64>().map(|h| h > 0).unwrap_or(false) {
                    da_hit += 1;
                }
            }
        } else if let Some(rest) = line.strip_prefix("BRDA:") {
            // BRDA:<line>,<block>,<branch>,<taken|->
            brda_total += 1;
            if let Some(taken) = rest.split(',').nth(3) {
                if taken.parse::<u64>().map(|t| t > 0).unwrap_or(false) {
                    brda_hit += 1;
                }
            }
        } else if let Some(count) = line.strip_prefix("LF:") {
            if let Ok(count) = count.parse::<u32>() {
                file.lines_total = count;
                has_line_summary = true;
            }
        } else if let Some(count) = line.strip_prefix("LH:") {
            if let Ok(count) = count.parse::<u32>() {
                file.lines_covered = count;
                has_line_summary = true;
            }
        } else if let Some(count) = line.strip_prefix("BRF:") {
            if let Ok(count) = count.parse::<u32>() {
                file.branches_total = count;
                has_branch_summary = true;
            }
        } else if let Some(count) = line.strip_prefix("BRH:") {
            if let Ok(count) = count.parse::<u32>() {
                file.branches_covered = count;
                has_branch_summary = true;
            }
        } else if line == "end_of_record" {
            if let Some(mut file) = current.take() {
                if !has_line_summary {
                    file.lines_total = da_total;
                    file.lines_covered = da_hit;
                }
                if !has_branch_summary {
                    file.branches_total = brda_total;
                    file.branches_covered = brda_hit;
                }
                data.push(file);
            }
        }
    }

    data
}
