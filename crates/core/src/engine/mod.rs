//! Map engine
//!
//! Per-file region extraction, directory rollups, reconciliation and the
//! scanner that drives them.

mod aggregate;
mod extractor;
mod reconcile;
mod scanner;
mod scope;

pub use aggregate::{partition, FolderAggregator, WatchPartition, DEFAULT_JOBS};
pub use extractor::{extract, extract_bytes, post_process};
pub use reconcile::{deep_clean, reconcile};
pub use scanner::{generate_map, resolve_target, MapScanner, ScanError};
pub use scope::{Closure, LineView, OpenScope, ScopeStack};
