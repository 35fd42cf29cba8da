//! Indentation-counted profiles

use super::{compile, group, Candidate, Detector, Dialect, LanguageProfile, Opener};
use crate::models::RegionKind;
use regex::Captures;

pub(super) fn python() -> LanguageProfile {
    LanguageProfile {
        name: "python",
        extensions: &["py", "pyi"],
        dialect: Dialect::Indentation,
        detectors: vec![
            Detector::new(r"^([ \t]*)(?:async\s+)?def\s+([A-Za-z0-9_]+)\s*\(", |caps| {
                indented(caps, RegionKind::Function)
            }),
            Detector::new(r"^([ \t]*)class\s+([A-Za-z0-9_]+)", |caps| {
                indented(caps, RegionKind::Type)
            }),
        ],
        dependencies: vec![compile(
            r"^\s*(?:from\s+([\w.]+)\s+import\b|import\s+([\w.]+))",
        )],
        hash_markers: true,
    }
}

/// Candidate whose scope closes on dedent to the width of group 1
fn indented(caps: &Captures<'_>, kind: RegionKind) -> Option<Candidate> {
    let width = caps.get(1).map_or(0, |m| m.as_str().len());
    Some(Candidate::new(kind, group(caps, 2)?, Opener::Indent(width)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_detectors() {
        let profile = python();

        let method = profile.detect("    async def fetch(self, url):").unwrap();
        assert_eq!(method.kind, RegionKind::Function);
        assert_eq!(method.name, "fetch");
        assert_eq!(method.opener, Opener::Indent(4));

        let class = profile.detect("class Repository(Base):").unwrap();
        assert_eq!(class.kind, RegionKind::Type);
        assert_eq!(class.opener, Opener::Indent(0));

        assert!(profile.detect("    return value").is_none());
    }

    #[test]
    fn test_python_dependencies() {
        let profile = python();
        assert_eq!(
            profile.dependency("from collections import OrderedDict"),
            Some("collections".to_string())
        );
        assert_eq!(profile.dependency("import os.path"), Some("os.path".to_string()));
        assert_eq!(profile.dependency("x = important(1)"), None);
    }
}
