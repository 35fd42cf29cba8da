//! Orphan reconciliation and deep clean

use crate::config::{Config, ConfigError, RootConfig};
use crate::output::levels::{is_level_artifact, LEVEL_FILES};
use crate::output::sidecar::{self, MAP_SUFFIX};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Remove sidecars whose source is gone, now ignored or no longer allowed
///
/// Ignored directories below a root only lose their four level artifacts;
/// the walk does not descend further into them. Returns the number of files
/// removed.
pub fn reconcile(config: &Config) -> Result<usize, ConfigError> {
    info!("Cleaning up orphaned maps");
    let mut removed = 0;
    for root in &config.roots {
        removed += reconcile_root(root)?;
    }
    info!("Removed {} obsolete map files", removed);
    Ok(removed)
}

fn reconcile_root(root: &RootConfig) -> Result<usize, ConfigError> {
    let rules = root.ignore_rules()?;
    let mut removed = 0;
    let mut walker = WalkDir::new(root.absolute_path()).into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().to_string();

        if entry.file_type().is_dir() {
            if entry.depth() > 0 && rules.is_ignored(&name) {
                removed += remove_level_artifacts(entry.path());
                walker.skip_current_dir();
            }
            continue;
        }

        if !name.ends_with(MAP_SUFFIX) || is_level_artifact(&name) {
            continue;
        }
        let Some(source) = sidecar::source_path(entry.path()) else {
            continue;
        };

        let orphaned = !source.exists() || rules.is_ignored_path(&source) || !root.allows(&source);
        if orphaned && remove(entry.path()) {
            removed += 1;
        }
    }
    Ok(removed)
}

fn remove_level_artifacts(dir: &Path) -> usize {
    LEVEL_FILES
        .iter()
        .map(|name| dir.join(name))
        .filter(|path| path.is_file() && remove(path))
        .count()
}

/// Remove every map artifact beneath `target`, regardless of configuration
pub fn deep_clean(target: &Path) -> usize {
    info!("Performing deep clean in {}", target.display());
    let removed = WalkDir::new(target)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| !e.file_type().is_dir())
        .filter(|e| sidecar::is_map_artifact(&e.file_name().to_string_lossy()))
        .filter(|e| remove(e.path()))
        .count();
    info!("Deep clean finished, removed {} files", removed);
    removed
}

fn remove(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed {}", path.display());
            true
        }
        Err(e) => {
            warn!("Failed to remove {}: {}", path.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "x\n").unwrap();
    }

    #[test]
    fn test_reconcile_removes_only_orphans() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("repo");
        touch(&root.join("keep.go"));
        touch(&root.join("keep.go.map.txt"));
        touch(&root.join("gone.go.map.txt"));
        touch(&root.join("notes.md"));
        touch(&root.join("notes.md.map.txt"));
        touch(&root.join(LEVEL_FILES[0]));

        let config = Config::new(vec![RootConfig::new(&root, vec![".go".to_string()])]);
        assert_eq!(reconcile(&config).unwrap(), 2);

        assert!(root.join("keep.go.map.txt").exists());
        assert!(!root.join("gone.go.map.txt").exists());
        assert!(!root.join("notes.md.map.txt").exists());
        assert!(root.join(LEVEL_FILES[0]).exists());
    }

    #[test]
    fn test_reconcile_ignored_directory_keeps_nested_sidecars() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("repo");
        let generated = root.join("generated");
        for name in LEVEL_FILES {
            touch(&generated.join(name));
        }
        touch(&generated.join("deep/orphan.go.map.txt"));

        let config = Config::new(vec![RootConfig::new(&root, vec![".go".to_string()])
            .with_ignored_dirs(vec!["generated".to_string()])]);
        assert_eq!(reconcile(&config).unwrap(), 4);
        assert!(LEVEL_FILES.iter().all(|n| !generated.join(n).exists()));
        assert!(generated.join("deep/orphan.go.map.txt").exists());
    }

    #[test]
    fn test_reconcile_ignored_source_name() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("repo");
        touch(&root.join("build.go"));
        touch(&root.join("build.go.map.txt"));

        let config = Config::new(vec![RootConfig::new(&root, vec![".go".to_string()])
            .with_ignored_dirs(vec!["*.go".to_string()])]);
        assert_eq!(reconcile(&config).unwrap(), 1);
    }

    #[test]
    fn test_deep_clean() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("a/b/c/x.rs.map.txt"));
        touch(&dir.path().join("a/_level_1.map.txt"));
        touch(&dir.path().join("a/b/x.rs"));

        assert_eq!(deep_clean(dir.path()), 2);
        assert!(dir.path().join("a/b/x.rs").exists());
    }
}
