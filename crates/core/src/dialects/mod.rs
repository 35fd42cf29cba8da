//! Language dialect table
//!
//! Every supported language is one [`LanguageProfile`] entry: the dialect that
//! governs scope closure, an ordered list of construct detectors and a list of
//! dependency patterns. Adding a language means adding a profile, the
//! extractor's control flow never changes.
//!
//! All patterns are compiled once into a process-wide, read-only table.

mod brace;
mod indent;
mod markup;

use crate::models::RegionKind;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Closure strategy of a language family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Scopes close on brace or parenthesis depth
    Brace,
    /// Scopes close on a dedent
    Indentation,
    /// Scopes close on the matching closing tag
    Tag,
    /// Point headings only, extended during post-processing
    Heading,
    /// No construct detection, manual markers only
    Plain,
}

/// How a detected construct opens its scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opener {
    /// Closed when brace depth returns to the enclosing level
    Brace,
    /// Closed when parenthesis depth returns to the enclosing level
    Paren,
    /// Closed by the first non-blank line indented at or below this width
    Indent(usize),
    /// Closed by `</tag>`
    Tag(String),
    /// Emitted immediately as a single-line region
    Point,
}

/// A construct matched on one line, before naming resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub kind: RegionKind,
    pub name: String,
    pub detail: Option<String>,
    pub opener: Opener,
}

impl Candidate {
    pub fn new(kind: RegionKind, name: impl Into<String>, opener: Opener) -> Self {
        Self {
            kind,
            name: name.into(),
            detail: None,
            opener,
        }
    }

    pub fn brace(kind: RegionKind, name: impl Into<String>) -> Self {
        Self::new(kind, name, Opener::Brace)
    }

    pub fn paren(kind: RegionKind, name: impl Into<String>) -> Self {
        Self::new(kind, name, Opener::Paren)
    }

    /// Set detail (builder pattern)
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Builds a candidate from a pattern match; `None` rejects the match
pub type BuildFn = fn(&Captures<'_>) -> Option<Candidate>;

/// One pattern in a profile's ordered detector list
pub struct Detector {
    pattern: Regex,
    build: BuildFn,
}

impl Detector {
    pub fn new(pattern: &str, build: BuildFn) -> Self {
        Self {
            pattern: compile(pattern),
            build,
        }
    }

    /// Try every match on the line and return the first accepted candidate
    pub fn detect(&self, line: &str) -> Option<Candidate> {
        self.pattern
            .captures_iter(line)
            .find_map(|caps| (self.build)(&caps))
    }
}

/// Dialect, detectors and dependency patterns for a family of extensions
pub struct LanguageProfile {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
    pub dialect: Dialect,
    pub detectors: Vec<Detector>,
    pub dependencies: Vec<Regex>,
    /// Accept `#` as a marker comment leader in addition to `//`
    pub hash_markers: bool,
}

impl LanguageProfile {
    /// First detector match wins
    pub fn detect(&self, line: &str) -> Option<Candidate> {
        self.detectors.iter().find_map(|d| d.detect(line))
    }

    /// Target of an import/include on this line, if any
    pub fn dependency(&self, line: &str) -> Option<String> {
        self.dependencies.iter().find_map(|re| {
            let caps = re.captures(line)?;
            caps.iter()
                .skip(1)
                .flatten()
                .map(|m| m.as_str().trim().trim_end_matches(';').trim())
                .find(|s| !s.is_empty())
                .map(str::to_string)
        })
    }

    fn plain() -> Self {
        Self {
            name: "plain",
            extensions: &[],
            dialect: Dialect::Plain,
            detectors: Vec::new(),
            dependencies: Vec::new(),
            hash_markers: false,
        }
    }
}

struct ProfileTable {
    profiles: Vec<LanguageProfile>,
    plain: LanguageProfile,
}

fn table() -> &'static ProfileTable {
    static TABLE: OnceLock<ProfileTable> = OnceLock::new();
    TABLE.get_or_init(|| ProfileTable {
        profiles: vec![
            brace::go(),
            brace::javascript(),
            brace::java(),
            brace::rust(),
            brace::stylesheet(),
            indent::python(),
            markup::html(),
            markup::markdown(),
        ],
        plain: LanguageProfile::plain(),
    })
}

/// All registered profiles
pub fn profiles() -> &'static [LanguageProfile] {
    &table().profiles
}

/// Profile for an extension (with or without the leading dot, any case)
pub fn profile_for(ext: &str) -> &'static LanguageProfile {
    let ext = ext.trim_start_matches('.').to_lowercase();
    let table = table();
    table
        .profiles
        .iter()
        .find(|p| p.extensions.contains(&ext.as_str()))
        .unwrap_or(&table.plain)
}

/// Outcome of the manual marker check for one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// A marker with a usable label
    Label(String),
    /// Marker syntax whose label cleaned down to nothing
    Empty,
}

/// Recognise `// 1. Label`, `// #region Label` and `// === Label ===`
pub fn parse_marker(line: &str, hash_markers: bool) -> Option<Marker> {
    static SLASH: OnceLock<Regex> = OnceLock::new();
    static HASH: OnceLock<Regex> = OnceLock::new();

    let slash = || {
        SLASH
            .get_or_init(|| compile(r"^\s*//\s*(?:(\d+)\.|#region|={3})\s*(.*)$"))
            .captures(line)
    };
    let hash = || {
        HASH.get_or_init(|| compile(r"^\s*#\s*(?:(\d+)\.|region\b|={3})\s*(.*)$"))
            .captures(line)
    };

    // A `#` comment may itself contain `//` (URLs), so fall through
    let caps = line
        .contains("//")
        .then(slash)
        .flatten()
        .or_else(|| (hash_markers && line.contains('#')).then(hash).flatten())?;

    let label = caps
        .get(2)
        .map(|m| m.as_str().trim())
        .unwrap_or_default()
        .trim_matches(|c: char| c == '=' || c == '-' || c == ' ' || c == '\t');

    if label.is_empty() {
        Some(Marker::Empty)
    } else {
        Some(Marker::Label(label.to_string()))
    }
}

/// Compile a pattern from the built-in table
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern must compile")
}

/// Trimmed, non-empty capture group
fn group(caps: &Captures<'_>, index: usize) -> Option<String> {
    caps.get(index)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
