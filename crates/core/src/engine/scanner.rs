use super::aggregate::FolderAggregator;
use super::extractor::extract_bytes;
use super::reconcile::{deep_clean, reconcile};
use crate::config::{walk_pruned, Config, ConfigError, IgnoreRules, CONFIG_FILE};
use crate::fsutil;
use crate::models::{FileMapRecord, FileMeta, ScanReport};
use crate::output::sidecar;
use crate::output::MapError;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Scanner errors
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Cannot resolve path {}: {source}", path.display())]
    PathResolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Map error: {0}")]
    MapError(#[from] MapError),

    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),
}

/// Maps produced by one pass
#[derive(Default)]
struct Batch {
    watched: Vec<PathBuf>,
    records: HashMap<PathBuf, FileMapRecord>,
    failed: usize,
}

/// Writes per-file maps and directory rollups for a root set
pub struct MapScanner {
    config: Config,
    rules: IgnoreRules,
    aggregator: FolderAggregator,
}

impl MapScanner {
    /// Create a scanner, compiling the ignore rules of every root
    pub fn new(config: Config) -> Result<Self, ScanError> {
        let rules = IgnoreRules::for_config(&config)?;
        let aggregator = FolderAggregator::new(&config)?;
        Ok(Self {
            config,
            rules,
            aggregator,
        })
    }

    /// Set the folder pool width (builder pattern)
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.aggregator = self.aggregator.with_jobs(jobs);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Map every allowed file under `target`, then roll up the configured roots
    ///
    /// Fails only when `target` cannot be resolved to an existing absolute path.
    pub fn scan(&self, target: &Path) -> Result<ScanReport, ScanError> {
        let start = Instant::now();
        let target = resolve_target(target)?;
        info!("Scanning {}", target.display());

        let files: Vec<PathBuf> = walk_pruned(&target, &self.rules)
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                let name = e.file_name().to_string_lossy();
                !sidecar::is_map_artifact(&name)
                    && name != CONFIG_FILE
                    && !self.rules.is_ignored(&name)
            })
            .map(|e| e.into_path())
            .filter(|path| self.config.allows(path))
            .collect();

        info!("Found {} files to map", files.len());
        self.finish(self.map_files(files), start)
    }

    /// Map allowed files that are not in `watchlist` (keys from [`fsutil::normalize_key`])
    pub fn scan_new(&self, watchlist: &HashSet<String>) -> Result<ScanReport, ScanError> {
        let start = Instant::now();
        info!("Scanning for new files only");
        let files = self.root_files(|root, path| {
            root.allows(path) && !watchlist.contains(&fsutil::normalize_key(path))
        })?;
        self.finish(self.map_files(files), start)
    }

    /// Map every file with extension `ext` under each root
    pub fn scan_extension(&self, ext: &str) -> Result<ScanReport, ScanError> {
        let start = Instant::now();
        let ext = crate::config::normalize_ext(ext);
        info!("Scanning for extension {}", ext);
        let files = self.root_files(|_, path| fsutil::extension_of(path) == ext)?;
        self.finish(self.map_files(files), start)
    }

    /// Deep clean every root, then map everything allowed
    pub fn scan_full(&self) -> Result<ScanReport, ScanError> {
        for root in &self.config.roots {
            deep_clean(&root.absolute_path());
        }
        self.scan_new(&HashSet::new())
    }

    /// Regenerate the four artifacts of one directory
    pub fn update_folder(&self, dir: &Path, watched: &[PathBuf]) -> Result<(), ScanError> {
        self.aggregator.update_folder(dir, watched)?;
        Ok(())
    }

    /// Remove sidecars that no longer match the configuration
    pub fn prune(&self) -> Result<usize, ScanError> {
        Ok(reconcile(&self.config)?)
    }

    /// Extract and write the sidecar map of one file
    pub fn generate_map(&self, path: &Path) -> Result<FileMapRecord, ScanError> {
        generate_map(path)
    }

    /// Files under each root accepted by `select`, walked with that root's rules
    fn root_files<F>(&self, select: F) -> Result<Vec<PathBuf>, ScanError>
    where
        F: Fn(&crate::config::RootConfig, &Path) -> bool,
    {
        let mut files = Vec::new();
        for root in &self.config.roots {
            let rules = root.ignore_rules()?;
            files.extend(
                walk_pruned(&root.absolute_path(), &rules)
                    .filter(|e| e.file_type().is_file())
                    .filter(|e| {
                        let name = e.file_name().to_string_lossy();
                        !sidecar::is_map_artifact(&name) && name != CONFIG_FILE
                    })
                    .map(|e| e.into_path())
                    .filter(|path| select(root, path)),
            );
        }
        Ok(files)
    }

    fn map_files(&self, files: Vec<PathBuf>) -> Batch {
        let mut batch = Batch::default();
        for path in files {
            match generate_map(&path) {
                Ok(record) => {
                    batch.records.insert(path.clone(), record);
                    batch.watched.push(path);
                }
                Err(e) => {
                    warn!("Failed to map {}: {}", path.display(), e);
                    batch.failed += 1;
                }
            }
        }
        batch
    }

    /// Roll up every directory; level 1 covers all allowed files, not just this pass
    fn finish(&self, batch: Batch, start: Instant) -> Result<ScanReport, ScanError> {
        let mut watched = self.root_files(|root, path| root.allows(path))?;
        watched.extend(batch.watched.iter().cloned());
        let directories = self.aggregator.run(&watched, &batch.records)?;
        let report = ScanReport {
            files_mapped: batch.watched.len(),
            files_failed: batch.failed,
            directories,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            "Mapped {} files ({} failed) in {}ms",
            report.files_mapped, report.files_failed, report.duration_ms
        );
        Ok(report)
    }
}

/// Absolute, cleaned form of an existing path
///
/// Callers resolve before doing any other work so a bad target aborts the
/// run with nothing written.
pub fn resolve_target(target: &Path) -> Result<PathBuf, ScanError> {
    let absolute = fsutil::absolute_clean(target).map_err(|source| ScanError::PathResolution {
        path: target.to_path_buf(),
        source,
    })?;
    if !absolute.exists() {
        return Err(ScanError::PathResolution {
            path: target.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
        });
    }
    Ok(absolute)
}

/// Extract and write the sidecar map of one file
pub fn generate_map(path: &Path) -> Result<FileMapRecord, ScanError> {
    let content = fs::read(path)?;
    let metadata = fs::metadata(path)?;
    let extraction = extract_bytes(&content, &fsutil::extension_of(path));

    let record = FileMapRecord {
        meta: FileMeta {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            path: path.to_path_buf(),
            size_bytes: metadata.len(),
            line_count: extraction.line_count,
            modified: metadata
                .modified()
                .map(fsutil::format_timestamp)
                .unwrap_or_default(),
        },
        regions: extraction.regions,
    };

    let written = sidecar::write(&record)?;
    debug!("Wrote {}", written.display());
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RootConfig;
    use crate::output::LEVEL_FILES;
    use tempfile::TempDir;

    fn project() -> (TempDir, PathBuf, Config) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("svc");
        fs::create_dir_all(root.join("handlers")).unwrap();
        fs::create_dir_all(root.join("dist")).unwrap();
        fs::write(root.join("main.go"), "package main\n\nfunc Serve() {\n\trun()\n}\n").unwrap();
        fs::write(root.join("handlers/user.ts"), "export class User {\n}\n").unwrap();
        fs::write(root.join("dist/bundle.ts"), "function x() {}\n").unwrap();
        fs::write(root.join("notes.txt"), "todo\n").unwrap();
        let config = Config::new(vec![RootConfig::new(
            &root,
            vec![".go".to_string(), ".ts".to_string()],
        )]);
        (dir, root, config)
    }

    #[test]
    fn test_scan_maps_allowed_files() {
        let (_dir, root, config) = project();
        let scanner = MapScanner::new(config).unwrap().with_jobs(2);
        let report = scanner.scan(&root).unwrap();

        assert_eq!(report.files_mapped, 2);
        assert_eq!(report.files_failed, 0);
        assert_eq!(report.directories, 2);
        assert!(root.join("main.go.map.txt").is_file());
        assert!(root.join("handlers/user.ts.map.txt").is_file());
        assert!(!root.join("dist/bundle.ts.map.txt").exists());
        assert!(!root.join("notes.txt.map.txt").exists());
        assert!(root.join(LEVEL_FILES[3]).is_file());

        let map = fs::read_to_string(root.join("main.go.map.txt")).unwrap();
        assert!(map.contains("LOC: 5\n"));
        assert!(map.contains("|    3 |    5 | ƒ Serve\n"));
    }

    #[test]
    fn test_scan_missing_target_is_fatal() {
        let (_dir, root, config) = project();
        let scanner = MapScanner::new(config).unwrap();
        let result = scanner.scan(&root.join("missing"));
        assert!(matches!(result, Err(ScanError::PathResolution { .. })));
    }

    #[test]
    fn test_scan_new_skips_watched() {
        let (_dir, root, config) = project();
        let scanner = MapScanner::new(config).unwrap();
        let watched = HashSet::from([fsutil::normalize_key(&root.join("main.go"))]);

        let report = scanner.scan_new(&watched).unwrap();
        assert_eq!(report.files_mapped, 1);
        assert!(!root.join("main.go.map.txt").exists());
        assert!(root.join("handlers/user.ts.map.txt").exists());
    }

    #[test]
    fn test_scan_extension() {
        let (_dir, root, config) = project();
        let scanner = MapScanner::new(config).unwrap();
        let report = scanner.scan_extension("GO").unwrap();
        assert_eq!(report.files_mapped, 1);
        assert!(root.join("main.go.map.txt").exists());
        assert!(!root.join("handlers/user.ts.map.txt").exists());
    }

    #[test]
    fn test_scan_full_replaces_stale_maps() {
        let (_dir, root, config) = project();
        fs::write(root.join("old.go.map.txt"), "stale").unwrap();
        let scanner = MapScanner::new(config).unwrap();

        let report = scanner.scan_full().unwrap();
        assert_eq!(report.files_mapped, 2);
        assert!(!root.join("old.go.map.txt").exists());
    }

    #[test]
    fn test_scan_through_parent_component_keeps_level_one() {
        let (_dir, root, config) = project();
        let scanner = MapScanner::new(config).unwrap();
        let report = scanner.scan(&root.join("handlers").join("..")).unwrap();
        assert_eq!(report.files_mapped, 2);

        let level1 = fs::read_to_string(root.join(LEVEL_FILES[1])).unwrap();
        assert!(level1.contains("### main.go\n"));
        assert!(level1.contains("|    3 |    5 | ƒ Serve\n"));
        let nested = fs::read_to_string(root.join("handlers").join(LEVEL_FILES[1])).unwrap();
        assert!(nested.contains("### user.ts\n"));
    }

    #[test]
    fn test_subtree_scan_rolls_up_whole_root() {
        let (_dir, root, config) = project();
        let scanner = MapScanner::new(config).unwrap();
        let report = scanner.scan(&root.join("handlers")).unwrap();
        assert_eq!(report.files_mapped, 1);
        assert_eq!(report.directories, 2);

        let nested = fs::read_to_string(root.join("handlers").join(LEVEL_FILES[1])).unwrap();
        assert!(nested.contains("### user.ts\n|    1 |    2 | 📦 User\n"));
        // main.go was never mapped, so the root lists no section for it
        let level1 = fs::read_to_string(root.join(LEVEL_FILES[1])).unwrap();
        assert!(!level1.contains("### main.go"));
    }

    #[test]
    fn test_extension_pass_keeps_other_sections() {
        let (_dir, root, config) = project();
        fs::write(root.join("handlers/job.go"), "package handlers\n\nfunc Run() {\n}\n").unwrap();
        let scanner = MapScanner::new(config).unwrap();
        scanner.scan(&root).unwrap();

        let report = scanner.scan_extension("go").unwrap();
        assert_eq!(report.files_mapped, 2);

        let level1 = fs::read_to_string(root.join("handlers").join(LEVEL_FILES[1])).unwrap();
        assert!(level1.contains("### job.go\n"));
        assert!(level1.contains("### user.ts\n|    1 |    2 | 📦 User\n"));
    }

    #[test]
    fn test_resolve_target_cleans_path() {
        let (_dir, root, _config) = project();
        let resolved = resolve_target(&root.join("handlers").join("..")).unwrap();
        assert_eq!(resolved, root);
    }

    #[test]
    fn test_generate_map_is_idempotent() {
        let (_dir, root, _config) = project();
        let first = generate_map(&root.join("handlers/user.ts")).unwrap();
        let second = generate_map(&root.join("handlers/user.ts")).unwrap();
        assert_eq!(first.regions, second.regions);
        assert_eq!(first.regions[0].label(), "📦 User");
    }
}
