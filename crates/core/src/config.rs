//! Configuration module for the map scanner
//!
//! This module provides the root set (paths, allowed extensions and extra
//! ignore names), its on-disk JSON shapes, and the ignore-name predicate used
//! by every directory walk.

use crate::fsutil::{absolute_clean, extension_of};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "codemap.json";

/// Names ignored everywhere regardless of configuration
pub const BUILTIN_IGNORES: &[&str] = &[
    ".git",
    "node_modules",
    "dist",
    "bin",
    "vendor",
    ".idea",
    ".vscode",
];

/// Extra ignore names written by automatic setup
pub const SETUP_IGNORES: &[&str] = &["node_modules", ".git", "dist", "build"];

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(String),
}

/// One directory tree to map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootConfig {
    /// Root directory
    pub path: PathBuf,

    /// Extensions to map, lower case with a leading dot
    pub allowed_exts: Vec<String>,

    /// Extra directory or file names to skip (plain names or globs)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignored_dirs: Vec<String>,
}

impl RootConfig {
    /// Create a root with the given allowed extensions
    pub fn new(path: impl Into<PathBuf>, allowed_exts: Vec<String>) -> Self {
        Self {
            path: path.into(),
            allowed_exts: allowed_exts.iter().map(|e| normalize_ext(e)).collect(),
            ignored_dirs: Vec::new(),
        }
    }

    /// Set extra ignore names (builder pattern)
    pub fn with_ignored_dirs(mut self, ignored: Vec<String>) -> Self {
        self.ignored_dirs = ignored;
        self
    }

    /// Whether a file's extension is in this root's allowed set
    pub fn allows(&self, path: &Path) -> bool {
        let ext = extension_of(path);
        !ext.is_empty() && self.allowed_exts.iter().any(|a| *a == ext)
    }

    /// Absolute form of the root path, relative paths resolved against the cwd
    pub fn absolute_path(&self) -> PathBuf {
        absolute_clean(&self.path).unwrap_or_else(|_| self.path.clone())
    }

    /// Compile this root's ignore predicate
    pub fn ignore_rules(&self) -> Result<IgnoreRules, ConfigError> {
        IgnoreRules::new(&self.ignored_dirs)
    }
}

/// Root set consumed by the scanner, the aggregator and the reconciler
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub roots: Vec<RootConfig>,
}

/// Older single-root shape, migrated on load
#[derive(Debug, Deserialize)]
struct LegacyConfig {
    #[serde(default)]
    allowed_exts: Vec<String>,
    #[serde(default)]
    root_path: String,
}

impl Config {
    /// Create a config from a root list
    pub fn new(roots: Vec<RootConfig>) -> Self {
        Self { roots }
    }

    /// Add a root (builder pattern)
    pub fn with_root(mut self, root: RootConfig) -> Self {
        self.roots.push(root);
        self
    }

    /// Whether any root allows this file's extension
    pub fn allows(&self, path: &Path) -> bool {
        self.roots.iter().any(|r| r.allows(path))
    }

    /// Parse the current shape, falling back to the legacy shape
    ///
    /// Returns `None` when neither shape yields a root. The boolean is true
    /// when the legacy shape was migrated and should be saved back.
    pub fn parse(data: &str) -> Option<(Config, bool)> {
        if let Ok(config) = serde_json::from_str::<Config>(data) {
            if !config.roots.is_empty() {
                return Some((config.normalized(), false));
            }
        }

        let legacy: LegacyConfig = serde_json::from_str(data).ok()?;
        Some((Config::migrate(legacy), true))
    }

    fn migrate(legacy: LegacyConfig) -> Config {
        let root_path = if legacy.root_path.is_empty() || legacy.root_path == "." {
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        } else {
            PathBuf::from(legacy.root_path)
        };
        Config::new(vec![RootConfig::new(root_path, legacy.allowed_exts)])
    }

    fn normalized(mut self) -> Self {
        for root in &mut self.roots {
            root.allowed_exts = root.allowed_exts.iter().map(|e| normalize_ext(e)).collect();
        }
        self
    }

    /// Load `path`, migrating the legacy shape, or run automatic setup
    ///
    /// Never fails: unreadable or unusable files fall through to setup and
    /// save errors are logged.
    pub fn load_or_setup(path: &Path) -> Config {
        match fs::read_to_string(path) {
            Ok(data) => match Config::parse(&data) {
                Some((config, migrated)) => {
                    if migrated {
                        warn!("Detected legacy config, migrating {}", path.display());
                        config.save_or_warn(path);
                    } else {
                        info!("Loaded config with {} roots", config.roots.len());
                    }
                    return config;
                }
                None => warn!("Config {} has no usable roots", path.display()),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to read {}: {}", path.display(), e),
        }

        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        info!("No valid config found, auto-configuring {}", cwd.display());
        let config = Config::auto_setup(&cwd);
        config.save_or_warn(path);
        config
    }

    /// Build a single-root config watching every extension found under `root`
    pub fn auto_setup(root: &Path) -> Config {
        let rules = IgnoreRules::builtin();
        let exts: BTreeSet<String> = walk_pruned(root, &rules)
            .filter(|e| e.file_type().is_file())
            .map(|e| extension_of(e.path()))
            .filter(|ext| !ext.is_empty())
            .collect();

        info!("Found extensions: {:?}", exts);

        let root = absolute_clean(root).unwrap_or_else(|_| root.to_path_buf());
        Config::new(vec![RootConfig::new(root, exts.into_iter().collect())
            .with_ignored_dirs(SETUP_IGNORES.iter().map(|s| s.to_string()).collect())])
    }

    /// Write the config as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    fn save_or_warn(&self, path: &Path) {
        if let Err(e) = self.save(path) {
            warn!("Failed to save config {}: {}", path.display(), e);
        }
    }
}

/// Lower-case an extension and make sure it has a leading dot
pub fn normalize_ext(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.is_empty() || ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

/// Ignore-name predicate for directory walks
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    /// Exact names, lower case
    names: Vec<String>,
    /// Glob patterns among the extra names
    globs: GlobSet,
}

impl IgnoreRules {
    /// Built-in names plus `extra` (plain names or globs, case-insensitive)
    pub fn new(extra: &[String]) -> Result<Self, ConfigError> {
        let mut names: Vec<String> = BUILTIN_IGNORES.iter().map(|s| s.to_string()).collect();
        let mut builder = GlobSetBuilder::new();

        for entry in extra {
            if entry.contains(['*', '?', '[', '{']) {
                let glob = GlobBuilder::new(entry)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| ConfigError::InvalidGlob(e.to_string()))?;
                builder.add(glob);
            } else {
                names.push(entry.to_lowercase());
            }
        }

        let globs = builder
            .build()
            .map_err(|e| ConfigError::InvalidGlob(e.to_string()))?;

        Ok(Self { names, globs })
    }

    /// Built-in names only
    pub fn builtin() -> Self {
        Self {
            names: BUILTIN_IGNORES.iter().map(|s| s.to_string()).collect(),
            globs: GlobSet::empty(),
        }
    }

    /// Union of every root's rules
    pub fn for_config(config: &Config) -> Result<Self, ConfigError> {
        let extra: Vec<String> = config
            .roots
            .iter()
            .flat_map(|r| r.ignored_dirs.iter().cloned())
            .collect();
        Self::new(&extra)
    }

    /// Check if a file or directory name should be skipped
    pub fn is_ignored(&self, name: &str) -> bool {
        if name.starts_with('.') && name != "." {
            return true;
        }
        let lower = name.to_lowercase();
        self.names.iter().any(|n| *n == lower) || self.globs.is_match(name)
    }

    /// Check a path by its final component
    pub fn is_ignored_path(&self, path: &Path) -> bool {
        path.file_name()
            .map(|n| self.is_ignored(&n.to_string_lossy()))
            .unwrap_or(false)
    }
}

/// Walk `root`, never descending into ignored directories
///
/// The walk start itself is exempt, so a root may live under an ignored name.
pub fn walk_pruned<'a>(
    root: &Path,
    rules: &'a IgnoreRules,
) -> impl Iterator<Item = walkdir::DirEntry> + 'a {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(move |e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            !rules.is_ignored(&e.file_name().to_string_lossy())
        })
        .filter_map(|e| e.ok())
}
