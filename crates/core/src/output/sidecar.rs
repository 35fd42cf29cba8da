//! Per-file sidecar maps
//!
//! A sidecar sits next to its source as `<file>.map.txt`: a metadata header,
//! a dashed separator, then one `| start | end | label` row per region. The
//! reader also accepts the older two-field `range|label` rows.

use super::MapError;
use crate::models::FileMapRecord;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix shared by every map artifact
pub const MAP_SUFFIX: &str = ".map.txt";

const SEPARATOR: &str = "--------------------------------------------------";
const HEADER_KEYS: &[&str] = &["File:", "Path:", "Size:", "LOC:", "Modified:"];

/// Sidecar path for a source file
pub fn sidecar_path(source: &Path) -> PathBuf {
    let mut name = source.as_os_str().to_os_string();
    name.push(MAP_SUFFIX);
    PathBuf::from(name)
}

/// Source path for a sidecar, `None` if the name lacks the suffix
pub fn source_path(sidecar: &Path) -> Option<PathBuf> {
    let name = sidecar.to_str()?;
    name.strip_suffix(MAP_SUFFIX).map(PathBuf::from)
}

/// Whether a file name is any kind of map artifact
pub fn is_map_artifact(name: &str) -> bool {
    name.ends_with(MAP_SUFFIX)
}

/// Render the full sidecar text for a record
pub fn render(record: &FileMapRecord) -> String {
    let meta = &record.meta;
    let mut out = String::new();
    let _ = writeln!(out, "File: {}", meta.name);
    let _ = writeln!(out, "Path: {}", meta.path.display());
    let _ = writeln!(out, "Size: {} KB", crate::fsutil::format_size_kb(meta.size_bytes));
    let _ = writeln!(out, "LOC: {}", meta.line_count);
    let _ = writeln!(out, "Modified: {}", meta.modified);
    let _ = writeln!(out, "{}", SEPARATOR);

    for region in record.rows() {
        let _ = writeln!(out, "| {:>4} | {:>4} | {}", region.start, region.end, region.label());
    }
    out
}

/// Write a record next to its source, returning the sidecar path
pub fn write(record: &FileMapRecord) -> Result<PathBuf, MapError> {
    let path = sidecar_path(&record.meta.path);
    fs::write(&path, render(record)).map_err(|source| MapError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// One region row as read back from a sidecar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapRow {
    /// `None` when the stored value was not a number
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub label: String,
}

impl MapRow {
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            label: label.into(),
        }
    }

    /// Canonical three-field row, unparseable bounds shown as `?`
    pub fn render(&self) -> String {
        format!(
            "| {:>4} | {:>4} | {}",
            bound(self.start),
            bound(self.end),
            self.label
        )
    }
}

fn bound(value: Option<usize>) -> String {
    value.map_or_else(|| "?".to_string(), |v| v.to_string())
}

/// Region rows of a sidecar's text, header skipped, both row formats accepted
pub fn parse_rows(content: &str) -> Vec<MapRow> {
    let mut rows = Vec::new();
    let mut in_header = true;

    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if in_header {
            if HEADER_KEYS.iter().any(|k| line.starts_with(k)) {
                continue;
            }
            if line.starts_with("-----") {
                in_header = false;
                continue;
            }
            let legacy = line.contains('|') && line.starts_with(|c: char| c.is_ascii_digit());
            if !line.starts_with('|') && !legacy {
                continue;
            }
            in_header = false;
        }
        rows.push(parse_row(line));
    }
    rows
}

fn parse_row(line: &str) -> MapRow {
    if let Some(rest) = line.strip_prefix('|') {
        let mut parts = rest.splitn(3, '|');
        if let (Some(start), Some(end), Some(label)) = (parts.next(), parts.next(), parts.next()) {
            return MapRow {
                start: start.trim().parse().ok(),
                end: end.trim().parse().ok(),
                label: label.trim().to_string(),
            };
        }
    }

    match line.split_once('|') {
        Some((range, label)) => {
            let range = range.trim();
            let (start, end) = range.split_once('-').unwrap_or((range, range));
            MapRow {
                start: start.trim().parse().ok(),
                end: end.trim().parse().ok(),
                label: label.trim().to_string(),
            }
        }
        None => MapRow {
            start: None,
            end: None,
            label: line.to_string(),
        },
    }
}

/// Read and parse a sidecar from disk
pub fn read_rows(sidecar: &Path) -> Result<Vec<MapRow>, MapError> {
    let content = fs::read(sidecar).map_err(|source| MapError::Io {
        path: sidecar.to_path_buf(),
        source,
    })?;
    Ok(parse_rows(&String::from_utf8_lossy(&content)))
}

/// Rows of a record produced in this run
pub fn record_rows(record: &FileMapRecord) -> Vec<MapRow> {
    record
        .rows()
        .iter()
        .map(|r| MapRow::new(r.start, r.end, r.label()))
        .collect()
}
