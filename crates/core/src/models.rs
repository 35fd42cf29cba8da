//! Data models for heuristic structure maps
//!
//! This module defines the core data structures shared by the extractor, the
//! sidecar codec and the directory rollups: regions with a structured
//! category, the per-file map record and the extraction result.

use std::path::PathBuf;

/// Kind of grouped declaration block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Imports,
    Const,
    Var,
}

impl BlockKind {
    /// Get the rendered label for the block
    pub fn label(&self) -> &'static str {
        match self {
            BlockKind::Imports => "📥 Imports",
            BlockKind::Const => "🧱 Const",
            BlockKind::Var => "🔨 Var",
        }
    }
}

/// Category of a detected region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    /// Function, method or property function
    Function,
    /// Class, struct or other named type
    Type,
    /// Interface or trait
    Interface,
    /// Object literal bound to a name
    Object,
    /// Grouped import/const/var declarations
    Block(BlockKind),
    /// HTTP route handler registration
    Route,
    /// Stylesheet rule
    StyleRule,
    /// Test suite wrapper (describe/context/suite)
    TestSuite,
    /// Single test case (it/test)
    TestCase,
    /// Structural markup element
    Element,
    /// Import/include reference to another file or module
    Dependency,
    /// Manual marker comment
    Marker,
    /// Markdown heading
    Heading,
    /// Fallback spanning the whole file
    WholeFile,
}

impl RegionKind {
    /// Containers lend their identifier to nested functions and test cases
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            RegionKind::Type | RegionKind::Interface | RegionKind::Object
        )
    }

    /// Whether a region of this kind takes the enclosing container as qualifier
    pub fn takes_qualifier(&self) -> bool {
        matches!(self, RegionKind::Function | RegionKind::TestCase)
    }

    /// Point regions are extended to the next region during post-processing
    pub fn is_point(&self) -> bool {
        matches!(
            self,
            RegionKind::Marker | RegionKind::Heading | RegionKind::Dependency
        )
    }
}

/// A named, line-ranged structural unit of a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Start line (1-indexed, inclusive)
    pub start: usize,
    /// End line (1-indexed, inclusive)
    pub end: usize,
    /// Structured category
    pub kind: RegionKind,
    /// Plain identifier (function name, selector, heading text, ...)
    pub name: String,
    /// Extra qualifier shown after the name (`struct`, `interface`, ...)
    pub detail: Option<String>,
    /// Identifier of the enclosing container, if any
    pub parent: Option<String>,
}

impl Region {
    pub fn new(kind: RegionKind, name: impl Into<String>, start: usize) -> Self {
        Self {
            start,
            end: start,
            kind,
            name: name.into(),
            detail: None,
            parent: None,
        }
    }

    /// Set detail (builder pattern)
    pub fn with_detail(mut self, detail: Option<String>) -> Self {
        self.detail = detail;
        self
    }

    /// Render the symbol-decorated label used in map artifacts
    pub fn label(&self) -> String {
        let qualified = match (&self.parent, self.kind) {
            (Some(parent), RegionKind::TestCase) => format!("{} » {}", parent, self.name),
            (Some(parent), RegionKind::Function) => format!("{}.{}", parent, self.name),
            _ => self.name.clone(),
        };

        match self.kind {
            RegionKind::Function => format!("ƒ {}", qualified),
            RegionKind::Type => match &self.detail {
                Some(detail) => format!("📦 {} ({})", qualified, detail),
                None => format!("📦 {}", qualified),
            },
            RegionKind::Interface => format!("📄 {}", qualified),
            RegionKind::Object => format!("🧱 {}", qualified),
            RegionKind::Block(block) => block.label().to_string(),
            RegionKind::Route => format!("🛣️ {}", qualified),
            RegionKind::StyleRule => format!("🎨 {}", qualified),
            RegionKind::TestSuite => format!("🧪 {}", qualified),
            RegionKind::TestCase => format!("✓ {}", qualified),
            RegionKind::Element => match &self.detail {
                Some(detail) => format!("<{}> {}", qualified, detail),
                None => format!("<{}>", qualified),
            },
            RegionKind::Dependency => format!("🔗 depends on: {}", qualified),
            RegionKind::Marker => format!("📍 {}", qualified),
            RegionKind::Heading => qualified,
            RegionKind::WholeFile => "(Entire File)".to_string(),
        }
    }
}

/// Result of running the extractor over one file's content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Regions sorted ascending by start line
    pub regions: Vec<Region>,
    /// Total line count
    pub line_count: usize,
}

/// Metadata header of a per-file map
#[derive(Debug, Clone)]
pub struct FileMeta {
    /// File name without directories
    pub name: String,
    /// Path as given to the scanner
    pub path: PathBuf,
    /// Size in bytes
    pub size_bytes: u64,
    /// Total line count
    pub line_count: usize,
    /// Last modification time, `YYYY-MM-DD HH:MM:SS` local time
    pub modified: String,
}

/// A per-file map: metadata header plus ordered regions
#[derive(Debug, Clone)]
pub struct FileMapRecord {
    pub meta: FileMeta,
    pub regions: Vec<Region>,
}

impl FileMapRecord {
    /// Regions as written to disk; a single whole-file row when nothing was detected
    pub fn rows(&self) -> Vec<Region> {
        if self.regions.is_empty() {
            let mut whole = Region::new(RegionKind::WholeFile, "", 1);
            whole.end = self.meta.line_count.max(1);
            vec![whole]
        } else {
            self.regions.clone()
        }
    }
}

/// Summary of a scan run
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub files_mapped: usize,
    pub files_failed: usize,
    pub directories: usize,
    pub duration_ms: u64,
}
