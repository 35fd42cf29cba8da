//! Small filesystem helpers shared by the scanner and the rollups

use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

/// Number of lines in `content`; a trailing newline does not start a new line
pub fn count_content_lines(content: &[u8]) -> usize {
    if content.is_empty() {
        return 0;
    }
    let newlines = content.iter().filter(|&&b| b == b'\n').count();
    if content.ends_with(b"\n") {
        newlines
    } else {
        newlines + 1
    }
}

/// Line count of a file on disk, 0 when it cannot be read
pub fn count_lines(path: &Path) -> usize {
    fs::read(path)
        .map(|content| count_content_lines(&content))
        .unwrap_or(0)
}

/// Size in kilobytes with two decimals (`12.34`)
pub fn format_size_kb(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / 1024.0)
}

/// Local time as `YYYY-MM-DD HH:MM:SS`
pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Local time as `YYYY-MM-DD HH:MM`
pub fn format_timestamp_short(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

/// Lower-case extension with a leading dot (`.rs`), empty when there is none
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Fold `.` and `..` components without touching the filesystem
///
/// `..` never climbs above the root of an absolute path.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match cleaned.components().next_back() {
                Some(Component::Normal(_)) => {
                    cleaned.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => cleaned.push(".."),
            },
            other => cleaned.push(other),
        }
    }
    cleaned
}

/// Absolute, lexically cleaned form of `path`, relative paths resolved against the cwd
pub fn absolute_clean(path: &Path) -> io::Result<PathBuf> {
    Ok(clean_path(&std::path::absolute(path)?))
}

/// Case-insensitive comparison key for a path
pub fn normalize_key(path: &Path) -> String {
    path.components()
        .collect::<PathBuf>()
        .to_string_lossy()
        .to_lowercase()
}
