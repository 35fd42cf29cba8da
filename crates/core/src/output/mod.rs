//! Output module
//!
//! This module provides the on-disk text formats: per-file sidecar maps and
//! the four per-directory rollup documents.

pub mod levels;
pub mod sidecar;

pub use levels::{FileSection, InventoryRow, TreeEntry, LEVEL_FILES};
pub use sidecar::{MapRow, MAP_SUFFIX};

use std::path::PathBuf;
use thiserror::Error;

/// Map artifact errors
#[derive(Error, Debug)]
pub enum MapError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
