//! Directory rollup documents
//!
//! Four plain-text artifacts per directory, each opened by the same header:
//! an inventory of immediate files (level 0), the region tables of watched
//! files (level 1), the subdirectory tree (level 2) and the full tree with
//! inlined region tables (level 3).

use super::sidecar::MapRow;
use std::fmt::Write as _;
use std::path::Path;

/// Artifact names, indexed by level
pub const LEVEL_FILES: [&str; 4] = [
    "_level_0.map.txt",
    "_level_1.map.txt",
    "_level_2.map.txt",
    "_level_3.map.txt",
];

const TITLES: [&str; 4] = ["INVENTORY", "STRUCTURE", "HIERARCHY", "DEEP STRUCTURE"];

/// Whether a file name is one of the four rollup artifacts
pub fn is_level_artifact(name: &str) -> bool {
    LEVEL_FILES.contains(&name)
}

/// One immediate file of a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRow {
    pub name: String,
    pub size_bytes: u64,
    pub line_count: usize,
    /// `YYYY-MM-DD HH:MM`
    pub modified: String,
}

/// Region table of one watched file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSection {
    pub name: String,
    pub rows: Vec<MapRow>,
}

/// An entry of the recursive tree below a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEntry {
    Dir {
        name: String,
        depth: usize,
    },
    /// `rows` is `Some` when the file has a sidecar
    File {
        name: String,
        depth: usize,
        rows: Option<Vec<MapRow>>,
    },
}

fn header(out: &mut String, level: usize, dir: &Path, generated: &str) {
    let dir_name = dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| dir.display().to_string());
    let _ = writeln!(out, "# LEVEL {}: {} - {}", level, TITLES[level], dir_name);
    let _ = writeln!(out, "Path: {}", dir.display());
    let _ = writeln!(out, "Generated: {}", generated);
    out.push('\n');
}

pub fn render_inventory(dir: &Path, generated: &str, rows: &[InventoryRow]) -> String {
    let mut out = String::new();
    header(&mut out, 0, dir, generated);
    let _ = writeln!(out, "Do you need code structure? See: {}", LEVEL_FILES[1]);
    let _ = writeln!(out, "Do you need subdirectories? See: {}", LEVEL_FILES[2]);
    out.push('\n');
    out.push_str("Name | Size | LOC | Modified\n");
    out.push_str("---|---|---|---\n");
    for row in rows {
        let _ = writeln!(
            out,
            "{} | {} | {} | {}",
            row.name, row.size_bytes, row.line_count, row.modified
        );
    }
    out
}

pub fn render_structure(dir: &Path, generated: &str, sections: &[FileSection]) -> String {
    let mut out = String::new();
    header(&mut out, 1, dir, generated);
    let _ = writeln!(out, "Need file inventory? See: {}", LEVEL_FILES[0]);
    let _ = writeln!(out, "Need subdirectories? See: {}", LEVEL_FILES[2]);
    out.push('\n');
    for section in sections {
        let _ = writeln!(out, "### {}", section.name);
        for row in &section.rows {
            out.push_str(&row.render());
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

pub fn render_hierarchy(dir: &Path, generated: &str, entries: &[TreeEntry]) -> String {
    let mut out = String::new();
    header(&mut out, 2, dir, generated);
    for entry in entries {
        if let TreeEntry::Dir { name, depth } = entry {
            let _ = writeln!(out, "{}- 📁 {}/", indent(*depth), name);
        }
    }
    out
}

pub fn render_deep(dir: &Path, generated: &str, entries: &[TreeEntry]) -> String {
    let mut out = String::new();
    header(&mut out, 3, dir, generated);
    for entry in entries {
        match entry {
            TreeEntry::Dir { name, depth } => {
                let _ = writeln!(out, "{}- 📁 {}/", indent(*depth), name);
            }
            TreeEntry::File {
                name,
                depth,
                rows: Some(rows),
            } => {
                let pad = indent(*depth);
                let _ = writeln!(out, "{}- 📄 {}", pad, name);
                for row in rows {
                    let _ = writeln!(out, "{}    {}", pad, row.render());
                }
            }
            TreeEntry::File {
                name,
                depth,
                rows: None,
            } => {
                let _ = writeln!(out, "{}- {}", indent(*depth), name);
            }
        }
    }
    out
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}
