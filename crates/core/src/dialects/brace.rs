//! Brace-counted profiles: Go, JavaScript/TypeScript, Java/C#, Rust and stylesheets

use super::{compile, group, Candidate, Detector, Dialect, LanguageProfile};
use crate::models::{BlockKind, RegionKind};

/// Identifiers that look like method definitions but are control flow
const JS_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "function", "return", "await", "else",
];

pub(super) fn go() -> LanguageProfile {
    LanguageProfile {
        name: "go",
        extensions: &["go"],
        dialect: Dialect::Brace,
        detectors: vec![
            Detector::new(
                r"^func\s+(?:\([^)]+\)\s+)?([A-Z][A-Za-z0-9_]*)\s*[\[(]",
                |caps| Some(Candidate::brace(RegionKind::Function, group(caps, 1)?)),
            ),
            Detector::new(
                r"^type\s+([A-Z][A-Za-z0-9_]*)\s+(struct|interface)",
                |caps| {
                    Some(
                        Candidate::brace(RegionKind::Type, group(caps, 1)?)
                            .with_detail(group(caps, 2)?),
                    )
                },
            ),
            Detector::new(r"^import\s*\(", |_| {
                Some(Candidate::paren(RegionKind::Block(BlockKind::Imports), "Imports"))
            }),
            Detector::new(r"^const\s*\(", |_| {
                Some(Candidate::paren(RegionKind::Block(BlockKind::Const), "Const"))
            }),
            Detector::new(r"^var\s*\(", |_| {
                Some(Candidate::paren(RegionKind::Block(BlockKind::Var), "Var"))
            }),
        ],
        dependencies: vec![compile(r#"^\s*import\s*(?:\(\s*)?(?:[A-Za-z_.]+\s+)?["']([^"']+)["']"#)],
        hash_markers: false,
    }
}

pub(super) fn javascript() -> LanguageProfile {
    LanguageProfile {
        name: "javascript",
        extensions: &["js", "mjs", "cjs", "jsx", "ts", "mts", "cts", "tsx"],
        dialect: Dialect::Brace,
        detectors: vec![
            Detector::new(
                r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*([A-Za-z0-9_$]+)\s*[(<]",
                |caps| Some(Candidate::brace(RegionKind::Function, group(caps, 1)?)),
            ),
            Detector::new(
                r"^(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+([A-Za-z0-9_$]+)",
                |caps| Some(Candidate::brace(RegionKind::Type, group(caps, 1)?)),
            ),
            Detector::new(
                r"^(?:export\s+)?(?:const|let|var)\s+([A-Za-z0-9_$]+)\s*(?::[^=]+)?=\s*(?:async\s*)?(?:\([^)]*\)|[A-Za-z0-9_$]+)\s*(?::[^=]+)?=>",
                |caps| Some(Candidate::brace(RegionKind::Function, group(caps, 1)?)),
            ),
            Detector::new(
                r"^(?:export\s+)?(?:declare\s+)?interface\s+([A-Za-z0-9_$]+)",
                |caps| Some(Candidate::brace(RegionKind::Interface, group(caps, 1)?)),
            ),
            Detector::new(
                r#"^\s*(?:describe|context|suite)(?:\.(?:only|skip))?\s*\(\s*["'`]([^"'`]+)["'`]"#,
                |caps| Some(Candidate::paren(RegionKind::TestSuite, group(caps, 1)?)),
            ),
            Detector::new(
                r#"^\s*(?:it|test)(?:\.(?:only|skip))?\s*\(\s*["'`]([^"'`]+)["'`]"#,
                |caps| Some(Candidate::paren(RegionKind::TestCase, group(caps, 1)?)),
            ),
            Detector::new(
                r"^(?:export\s+)?(?:const|let|var)\s+([A-Za-z0-9_$]+)\s*(?::[^=]+)?=\s*\{",
                |caps| Some(Candidate::brace(RegionKind::Object, group(caps, 1)?)),
            ),
            Detector::new(r"^export\s+default\s*\{", |_| {
                Some(Candidate::brace(RegionKind::Type, "default").with_detail("export"))
            }),
            Detector::new(
                r#"^(?:router|app)\.(get|post|put|delete|patch|use)\s*\(\s*["']([^"']+)["']"#,
                |caps| {
                    let method = group(caps, 1)?.to_uppercase();
                    let path = group(caps, 2)?;
                    Some(Candidate::paren(
                        RegionKind::Route,
                        format!("{} {}", method, path),
                    ))
                },
            ),
            Detector::new(
                r"^\s*(?:(?:public|private|protected|static|readonly|override|get|set)\s+)*(?:async\s+)?\*?([A-Za-z0-9_$]+)\s*\([^)]*\)\s*(?::[^{]+)?\{",
                |caps| {
                    let name = group(caps, 1)?;
                    if JS_KEYWORDS.contains(&name.as_str()) {
                        return None;
                    }
                    Some(Candidate::brace(RegionKind::Function, name))
                },
            ),
            Detector::new(
                r"^\s*([A-Za-z0-9_$]+)\s*:\s*(?:async\s+)?function\s*\*?\s*\(",
                |caps| Some(Candidate::brace(RegionKind::Function, group(caps, 1)?)),
            ),
            Detector::new(
                r"^\s*([A-Za-z0-9_$]+)\s*:\s*(?:async\s+)?(?:\([^)]*\)|[A-Za-z0-9_$]+)\s*=>",
                |caps| Some(Candidate::brace(RegionKind::Function, group(caps, 1)?)),
            ),
        ],
        dependencies: vec![compile(
            r#"(?:^\s*(?:import|export)\s+(?:.*\s+from\s+)?|require\s*\(\s*)["']([^"']+)["']"#,
        )],
        hash_markers: false,
    }
}

pub(super) fn java() -> LanguageProfile {
    LanguageProfile {
        name: "java",
        extensions: &["java", "cs"],
        dialect: Dialect::Brace,
        detectors: vec![
            Detector::new(
                r"^\s*(?:(?:public|protected|private|internal|static|final|abstract|sealed|partial)\s+)*(class|interface|enum|record|struct)\s+([A-Za-z0-9_]+)",
                |caps| {
                    let kind = match caps.get(1)?.as_str() {
                        "interface" => RegionKind::Interface,
                        _ => RegionKind::Type,
                    };
                    Some(Candidate::brace(kind, group(caps, 2)?))
                },
            ),
            Detector::new(
                r"^\s*(?:public|protected|private|internal)\s+(?:(?:static|final|abstract|override|virtual|async|synchronized)\s+)*[\w<>\[\],?]+\s+([A-Za-z0-9_]+)\s*\(",
                |caps| Some(Candidate::brace(RegionKind::Function, group(caps, 1)?)),
            ),
        ],
        dependencies: vec![compile(r"^\s*(?:import|using)\s+(?:static\s+)?([\w.]+)\s*;")],
        hash_markers: false,
    }
}

pub(super) fn rust() -> LanguageProfile {
    LanguageProfile {
        name: "rust",
        extensions: &["rs"],
        dialect: Dialect::Brace,
        detectors: vec![
            Detector::new(
                r"^\s*(?:pub(?:\([^)]*\))?\s+)?(struct|enum|union)\s+([A-Za-z_][A-Za-z0-9_]*)",
                |caps| {
                    Some(
                        Candidate::brace(RegionKind::Type, group(caps, 2)?)
                            .with_detail(group(caps, 1)?),
                    )
                },
            ),
            Detector::new(
                r"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:unsafe\s+)?trait\s+([A-Za-z_][A-Za-z0-9_]*)",
                |caps| Some(Candidate::brace(RegionKind::Interface, group(caps, 1)?)),
            ),
            Detector::new(
                r"^\s*(?:unsafe\s+)?impl(?:\s*<[^>]*>)?\s+(?:[\w:<>, ]+\s+for\s+)?([A-Za-z_][A-Za-z0-9_]*)",
                |caps| {
                    Some(Candidate::brace(RegionKind::Type, group(caps, 1)?).with_detail("impl"))
                },
            ),
            Detector::new(
                r"^\s*(?:pub(?:\([^)]*\))?\s+)?mod\s+([A-Za-z_][A-Za-z0-9_]*)\s*\{",
                |caps| Some(Candidate::brace(RegionKind::Type, group(caps, 1)?).with_detail("mod")),
            ),
            Detector::new(
                r#"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:const\s+)?(?:async\s+)?(?:unsafe\s+)?(?:extern\s+"[^"]*"\s+)?fn\s+([A-Za-z_][A-Za-z0-9_]*)"#,
                |caps| Some(Candidate::brace(RegionKind::Function, group(caps, 1)?)),
            ),
        ],
        dependencies: vec![compile(r"^\s*(?:pub(?:\([^)]*\))?\s+)?use\s+([\w:]+)")],
        hash_markers: false,
    }
}

pub(super) fn stylesheet() -> LanguageProfile {
    LanguageProfile {
        name: "stylesheet",
        extensions: &["css", "scss", "less"],
        dialect: Dialect::Brace,
        detectors: vec![Detector::new(r"^\s*([^{\s][^{]*)\{\s*$", |caps| {
            let selector = group(caps, 1)?;
            if selector.starts_with("//") || selector.starts_with("/*") {
                return None;
            }
            Some(Candidate::brace(RegionKind::StyleRule, selector))
        })],
        dependencies: vec![compile(r#"@import\s*(?:url\s*\(\s*)?["']?([^"')\s;]+)["']?"#)],
        hash_markers: false,
    }
}
