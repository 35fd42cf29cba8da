//! Folder aggregator
//!
//! Rolls per-file maps up into the four directory artifacts for every
//! directory under the configured roots. Directories are processed on a
//! fixed-width rayon pool; each task only reads the precomputed watch
//! partition and writes its own directory's artifacts.

use super::scanner::ScanError;
use crate::config::{walk_pruned, Config, ConfigError, IgnoreRules};
use crate::fsutil;
use crate::models::FileMapRecord;
use crate::output::levels::{self, FileSection, InventoryRow, TreeEntry, LEVEL_FILES};
use crate::output::sidecar::{self, MapRow};
use crate::output::MapError;
use chrono::{Local, SecondsFormat};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Default number of directories processed at once
pub const DEFAULT_JOBS: usize = 10;

/// Watched files grouped by containing directory, each group sorted
pub type WatchPartition = BTreeMap<PathBuf, Vec<PathBuf>>;

/// Group watched files by their parent directory
pub fn partition(watched: &[PathBuf]) -> WatchPartition {
    let mut groups = WatchPartition::new();
    for file in watched {
        let dir = file.parent().map(Path::to_path_buf).unwrap_or_default();
        groups.entry(dir).or_default().push(file.clone());
    }
    for files in groups.values_mut() {
        files.sort();
        files.dedup();
    }
    groups
}

/// Writes level artifacts for the directories of a root set
pub struct FolderAggregator {
    roots: Vec<(PathBuf, IgnoreRules)>,
    rules: IgnoreRules,
    jobs: usize,
}

impl FolderAggregator {
    /// Create an aggregator, compiling every root's ignore rules
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let roots = config
            .roots
            .iter()
            .map(|root| Ok((root.absolute_path(), root.ignore_rules()?)))
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            roots,
            rules: IgnoreRules::for_config(config)?,
            jobs: DEFAULT_JOBS,
        })
    }

    /// Set pool width (builder pattern)
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Every directory reachable under a root, ignored names pruned
    pub fn target_directories(&self) -> BTreeSet<PathBuf> {
        self.roots
            .iter()
            .flat_map(|(root, rules)| {
                walk_pruned(root, rules)
                    .filter(|e| e.file_type().is_dir())
                    .map(|e| e.into_path())
            })
            .collect()
    }

    /// Regenerate the artifacts of every target directory
    ///
    /// `records` holds maps produced earlier in the same run; files missing
    /// from it fall back to their sidecar on disk. Returns the number of
    /// directories written. Per-directory failures are logged and skipped.
    pub fn run(
        &self,
        watched: &[PathBuf],
        records: &HashMap<PathBuf, FileMapRecord>,
    ) -> Result<usize, ScanError> {
        info!("Generating folder maps");
        let groups = partition(watched);
        let dirs: Vec<PathBuf> = self.target_directories().into_iter().collect();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| ScanError::ThreadPoolError(e.to_string()))?;

        let written = pool.install(|| {
            dirs.par_iter()
                .filter(|dir| {
                    let files = groups.get(*dir).map_or(&[][..], Vec::as_slice);
                    match self.write_directory(dir, files, records) {
                        Ok(()) => true,
                        Err(e) => {
                            warn!("Failed to write folder maps for {}: {}", dir.display(), e);
                            false
                        }
                    }
                })
                .count()
        });

        info!("Wrote folder maps for {} of {} directories", written, dirs.len());
        Ok(written)
    }

    /// Regenerate one directory's artifacts from the watched files inside it
    ///
    /// Parent directories are compared case-insensitively.
    pub fn update_folder<'a>(
        &self,
        dir: &Path,
        watched: impl IntoIterator<Item = &'a PathBuf>,
    ) -> Result<(), MapError> {
        let key = fsutil::normalize_key(dir);
        let mut files: Vec<PathBuf> = watched
            .into_iter()
            .filter(|f| f.parent().is_some_and(|p| fsutil::normalize_key(p) == key))
            .cloned()
            .collect();
        files.sort();
        self.write_directory(dir, &files, &HashMap::new())
    }

    fn write_directory(
        &self,
        dir: &Path,
        watched: &[PathBuf],
        records: &HashMap<PathBuf, FileMapRecord>,
    ) -> Result<(), MapError> {
        let generated = Local::now().to_rfc3339_opts(SecondsFormat::Secs, false);

        let inventory = self.inventory(dir)?;
        let sections: Vec<FileSection> = watched
            .iter()
            .filter_map(|file| {
                let rows = rows_for(file, records)?;
                let name = file.file_name()?.to_string_lossy().to_string();
                Some(FileSection { name, rows })
            })
            .collect();
        let tree = self.tree(dir, records);

        let documents = [
            levels::render_inventory(dir, &generated, &inventory),
            levels::render_structure(dir, &generated, &sections),
            levels::render_hierarchy(dir, &generated, &tree),
            levels::render_deep(dir, &generated, &tree),
        ];
        for (name, text) in LEVEL_FILES.iter().zip(documents) {
            let path = dir.join(name);
            fs::write(&path, text).map_err(|source| MapError::Io { path, source })?;
        }

        debug!("Wrote folder maps for {}", dir.display());
        Ok(())
    }

    /// Immediate files, map artifacts and ignored names excluded
    fn inventory(&self, dir: &Path) -> Result<Vec<InventoryRow>, MapError> {
        let entries = fs::read_dir(dir).map_err(|source| MapError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut rows: Vec<InventoryRow> = entries
            .filter_map(|e| e.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                if sidecar::is_map_artifact(&name) || self.rules.is_ignored(&name) {
                    return None;
                }
                let meta = entry.metadata().ok()?;
                if meta.is_dir() {
                    return None;
                }
                let modified = meta
                    .modified()
                    .map(fsutil::format_timestamp_short)
                    .unwrap_or_default();
                Some(InventoryRow {
                    line_count: fsutil::count_lines(&entry.path()),
                    name,
                    size_bytes: meta.len(),
                    modified,
                })
            })
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    /// Recursive listing below `dir`, depth-first in name order
    fn tree(&self, dir: &Path, records: &HashMap<PathBuf, FileMapRecord>) -> Vec<TreeEntry> {
        WalkDir::new(dir)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0 || !self.rules.is_ignored(&e.file_name().to_string_lossy())
            })
            .filter_map(|e| e.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                let depth = entry.depth() - 1;
                if entry.file_type().is_dir() {
                    return Some(TreeEntry::Dir { name, depth });
                }
                if sidecar::is_map_artifact(&name) {
                    return None;
                }
                let rows = rows_for(entry.path(), records);
                Some(TreeEntry::File { name, depth, rows })
            })
            .collect()
    }
}

/// Region rows for a file: this run's record, else its sidecar on disk
fn rows_for(file: &Path, records: &HashMap<PathBuf, FileMapRecord>) -> Option<Vec<MapRow>> {
    if let Some(record) = records.get(file) {
        return Some(sidecar::record_rows(record));
    }
    let map = sidecar::sidecar_path(file);
    if !map.is_file() {
        return None;
    }
    match sidecar::read_rows(&map) {
        Ok(rows) => Some(rows),
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}
