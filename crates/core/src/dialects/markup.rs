//! Tag-matched markup and heading-marked documents

use super::{compile, group, Candidate, Detector, Dialect, LanguageProfile, Opener};
use crate::models::RegionKind;
use regex::Regex;
use std::sync::OnceLock;

/// Elements worth a region of their own
const STRUCTURAL_TAGS: &[&str] = &[
    "body", "div", "section", "article", "header", "footer", "nav", "main", "script", "style",
    "template",
];

pub(super) fn html() -> LanguageProfile {
    LanguageProfile {
        name: "markup",
        extensions: &["html", "htm", "xml", "vue", "php"],
        dialect: Dialect::Tag,
        detectors: vec![Detector::new(r"<\s*([A-Za-z0-9-]+)\b([^>]*)>", |caps| {
            let tag = caps.get(1)?.as_str().to_lowercase();
            let attrs = caps.get(2).map_or("", |m| m.as_str());
            if !STRUCTURAL_TAGS.contains(&tag.as_str()) || attrs.trim_end().ends_with('/') {
                return None;
            }
            let mut candidate = Candidate::new(RegionKind::Element, tag.clone(), Opener::Tag(tag));
            candidate.detail = element_detail(attrs);
            Some(candidate)
        })],
        dependencies: vec![
            compile(r#"<\s*script\s+[^>]*src=["']([^"']+)["']"#),
            compile(
                r#"<\s*link\s+[^>]*href=["']([^"']+)["'][^>]*rel=["']stylesheet["']|<\s*link\s+[^>]*rel=["']stylesheet["'][^>]*href=["']([^"']+)["']"#,
            ),
        ],
        hash_markers: false,
    }
}

pub(super) fn markdown() -> LanguageProfile {
    LanguageProfile {
        name: "markdown",
        extensions: &["md", "markdown"],
        dialect: Dialect::Heading,
        detectors: vec![Detector::new(r"^(#+)\s+(.*)$", |caps| {
            Some(Candidate::new(RegionKind::Heading, group(caps, 2)?, Opener::Point))
        })],
        dependencies: Vec::new(),
        hash_markers: false,
    }
}

/// `#id` when present, otherwise `.first-class`
fn element_detail(attrs: &str) -> Option<String> {
    static ID: OnceLock<Regex> = OnceLock::new();
    static CLASS: OnceLock<Regex> = OnceLock::new();

    let id = ID.get_or_init(|| compile(r#"\bid=["']([^"']+)["']"#));
    if let Some(caps) = id.captures(attrs) {
        return Some(format!("#{}", &caps[1]));
    }

    let class = CLASS.get_or_init(|| compile(r#"\bclass=["']([^"']+)["']"#));
    let caps = class.captures(attrs)?;
    caps[1]
        .split_whitespace()
        .next()
        .map(|first| format!(".{}", first))
}
