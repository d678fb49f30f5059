//! Cobertura XML format parser

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;

use super::{CoverageData, FileStats};

/// Parse Cobertura XML content from a string
///
/// Classes sharing a `filename` are merged into one entry. `<line>` elements
/// repeated under `<methods>` are skipped so lines are not counted twice.
/// Relative filenames are joined onto the first `<source>` root.
pub fn parse_cobertura_string(content: &str) -> Result<CoverageData, String> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut data = CoverageData::default();
    let mut current: Option<FileStats> = None;
    let mut methods_depth = 0usize;
    let mut in_source = false;
    let mut source: Option<String> = None;

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"class" => current = class_stats(e, source.as_deref()),
                b"methods" => methods_depth += 1,
                b"source" => in_source = true,
                b"line" if methods_depth == 0 => count_line(e, current.as_mut()),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                // A class with no lines still counts as an analyzed file
                b"class" => {
                    if let Some(stats) = class_stats(e, source.as_deref()) {
                        data.push(stats);
                    }
                }
                b"line" if methods_depth == 0 => count_line(e, current.as_mut()),
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"class" => {
                    if let Some(stats) = current.take() {
                        data.push(stats);
                    }
                }
                b"methods" => methods_depth = methods_depth.saturating_sub(1),
                b"source" => in_source = false,
                _ => {}
            },
            Ok(Event::Text(ref t)) if in_source && source.is_none() => {
                let text = t.unescape().map_err(|e| format!("Invalid <source> text: {}", e))?;
                let text = text.trim();
                if !text.is_empty() {
                    source = Some(text.to_string());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "Error parsing Cobertura XML at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(data)
}

fn class_stats(e: &BytesStart, source: Option<&str>) -> Option<FileStats> {
    let filename = e
        .attributes()
        .filter_map(|a| a.ok())
        .find(|attr| attr.key.as_ref() == b"filename")
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
        .filter(|filename| !filename.is_empty())?;

    let path = match source {
        Some(source) if Path::new(&filename).is_relative() => {
            Path::new(source).join(&filename).to_string_lossy().to_string()
        }
        _ => filename,
    };

    Some(FileStats::new(path))
}

fn count_line(e: &BytesStart, file: Option<&mut FileStats>) {
    let Some(file) = file else {
        return;
    };

    file.lines_total += 1;

    for attr in e.attributes().filter_map(|a| a.ok()) {
        match attr.key.as_ref() {
            b"hits" => {
                if let Ok(hits) = String::from_utf8_lossy(&attr.value).parse::<u64>() {
                    if hits > 0 {
                        file.lines_covered += 1;
                    }
                }
            }
            b"condition-coverage" => {
                // Parse "50% (1/2)" format
                let value = String::from_utf8_lossy(&attr.value);
                if let Some((covered, total)) = parse_condition_coverage(&value) {
                    file.branches_covered += covered;
                    file.branches_total += total;
                }
            }
            _ => {}
        }
    }
}

fn parse_condition_coverage(value: &str) -> Option<(u32, u32)> {
    let start = value.find('(')?;
    let end = value[start..].find(')')? + start;
    let (covered, total) = value[start + 1..end].split_once('/')?;
    Some((covered.trim().parse().ok()?, total.trim().parse().ok()?))
}
