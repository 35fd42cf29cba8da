//! codemap_core - Core library for heuristic structure maps
//!
//! This crate builds a lightweight, human- and LLM-readable index of a source
//! tree without parsing it. Every source file gets a `<file>.map.txt` sidecar
//! listing the line ranges of its functions, types, blocks, tests, markup
//! elements, style rules, headings and manual markers; every directory gets
//! four rollup documents (`_level_0.map.txt` .. `_level_3.map.txt`).
//!
//! # Features
//!
//! - **Dialect table**: brace-counted, indentation-counted, tag-matched and
//!   heading-marked languages share one scope-stack extractor.
//! - **Parent naming**: methods and test cases are qualified by their
//!   enclosing class, interface or object (`Widget.render`, `Widget » case`).
//! - **Directory rollups**: inventory, structure, hierarchy and deep
//!   structure per directory, written on a bounded thread pool.
//! - **Reconciliation**: stale sidecars are removed when their source is
//!   deleted, ignored or no longer allowed.
//!
//! # Example
//!
//! ```rust,no_run
//! use codemap_core::{Config, MapScanner, RootConfig};
//! use std::path::Path;
//!
//! let config = Config::new(vec![RootConfig::new(".", vec![".rs".to_string()])]);
//! let scanner = MapScanner::new(config).unwrap();
//!
//! let report = scanner.scan(Path::new(".")).unwrap();
//! println!("mapped {} files", report.files_mapped);
//! ```

pub mod config;
pub mod dialects;
pub mod engine;
pub mod fsutil;
pub mod models;
pub mod output;

// Re-exports for convenience
pub use config::{normalize_ext, Config, ConfigError, IgnoreRules, RootConfig, CONFIG_FILE};
pub use dialects::{profile_for, Dialect, LanguageProfile};
pub use engine::{
    deep_clean, extract, extract_bytes, generate_map, reconcile, resolve_target, FolderAggregator,
    MapScanner, ScanError, DEFAULT_JOBS,
};
pub use models::{
    BlockKind, Extraction, FileMapRecord, FileMeta, Region, RegionKind, ScanReport,
};
pub use output::{MapError, MapRow, LEVEL_FILES, MAP_SUFFIX};
