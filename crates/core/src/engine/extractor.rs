//! Region extractor
//!
//! A single pass over the lines of one file. Running brace/parenthesis depths
//! and an explicit [`ScopeStack`] track nested constructs for every dialect;
//! markers, headings and dependency references are emitted as point regions
//! and stretched over the following lines during post-processing.

use super::scope::{Closure, LineView, OpenScope, ScopeStack};
use crate::dialects::{
    parse_marker, profile_for, Candidate, Dialect, LanguageProfile, Marker, Opener,
};
use crate::models::{Extraction, Region, RegionKind};

/// Extract the sorted region list of a file from its content and extension
pub fn extract(content: &str, ext: &str) -> Extraction {
    let mut machine = RegionMachine::new(profile_for(ext));
    for (idx, line) in content.lines().enumerate() {
        machine.feed(idx + 1, line);
    }
    machine.finish()
}

/// Same as [`extract`] for raw bytes; invalid UTF-8 is replaced, never rejected
pub fn extract_bytes(content: &[u8], ext: &str) -> Extraction {
    extract(&String::from_utf8_lossy(content), ext)
}

struct RegionMachine {
    profile: &'static LanguageProfile,
    brace_depth: isize,
    paren_depth: isize,
    stack: ScopeStack,
    regions: Vec<Region>,
    line_count: usize,
    last_content_line: usize,
    in_fence: bool,
}

impl RegionMachine {
    fn new(profile: &'static LanguageProfile) -> Self {
        Self {
            profile,
            brace_depth: 0,
            paren_depth: 0,
            stack: ScopeStack::new(),
            regions: Vec::new(),
            line_count: 0,
            last_content_line: 0,
            in_fence: false,
        }
    }

    fn feed(&mut self, number: usize, text: &str) {
        self.line_count = number;
        self.step(number, text);
        if !text.trim().is_empty() {
            self.last_content_line = number;
        }
    }

    fn step(&mut self, number: usize, text: &str) {
        if self.profile.dialect == Dialect::Brace {
            self.update_depths(text);
        }

        if !self.stack.is_empty() {
            let view = LineView {
                text,
                number,
                brace_depth: self.brace_depth,
                paren_depth: self.paren_depth,
                last_content_line: self.last_content_line,
            };
            let closed = self.stack.close_matching(&view);
            self.regions.extend(closed);
        }

        // Markers pre-empt every heuristic on their line
        if let Some(marker) = parse_marker(text, self.profile.hash_markers) {
            if let Marker::Label(label) = marker {
                self.regions.push(Region::new(RegionKind::Marker, label, number));
            }
            return;
        }

        if self.profile.dialect == Dialect::Heading {
            let trimmed = text.trim_start();
            if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
                self.in_fence = !self.in_fence;
                return;
            }
            if self.in_fence {
                return;
            }
        }

        let candidate = self.profile.detect(text);

        if let Some(target) = self.profile.dependency(text) {
            self.regions
                .push(Region::new(RegionKind::Dependency, target, number));
        }

        if let Some(candidate) = candidate {
            self.open(candidate, number, text);
        }
    }

    fn update_depths(&mut self, text: &str) {
        for ch in text.chars() {
            match ch {
                '{' => self.brace_depth += 1,
                '}' => self.brace_depth -= 1,
                '(' => self.paren_depth += 1,
                ')' => self.paren_depth -= 1,
                _ => {}
            }
        }
    }

    fn open(&mut self, candidate: Candidate, number: usize, text: &str) {
        let Candidate {
            kind,
            name,
            detail,
            opener,
        } = candidate;
        let mut region = Region::new(kind, name, number).with_detail(detail);

        // The enclosing level is the depth before this line's own opener
        let closure = match opener {
            Opener::Point => {
                self.regions.push(region);
                return;
            }
            Opener::Brace => Closure::Brace(self.brace_depth - isize::from(text.contains('{'))),
            Opener::Paren => Closure::Paren(self.paren_depth - isize::from(text.contains('('))),
            Opener::Indent(width) => Closure::Indent(width),
            Opener::Tag(tag) => Closure::Tag(tag),
        };

        if kind.takes_qualifier() {
            region.parent = self.stack.nearest_container().map(str::to_string);
        }

        if closure.closes_on_opening_line(text) {
            self.regions.push(region);
            return;
        }

        self.stack.push(OpenScope { region, closure });
    }

    fn finish(mut self) -> Extraction {
        let closed = self.stack.drain(self.line_count);
        self.regions.extend(closed);
        Extraction {
            regions: post_process(self.regions, self.line_count),
            line_count: self.line_count,
        }
    }
}

/// Sort by start, stretch point regions to the next region, clamp ranges
pub fn post_process(mut regions: Vec<Region>, line_count: usize) -> Vec<Region> {
    let last_line = line_count.max(1);
    regions.sort_by_key(|r| r.start);

    let starts: Vec<usize> = regions.iter().map(|r| r.start).collect();
    for (idx, region) in regions.iter_mut().enumerate() {
        if !region.kind.is_point() {
            continue;
        }
        region.end = match starts.get(idx + 1) {
            Some(&next) if next > region.start => next - 1,
            Some(_) => region.start,
            None => last_line,
        };
    }

    for region in &mut regions {
        region.start = region.start.clamp(1, last_line);
        region.end = region.end.clamp(region.start, last_line);
    }

    regions
}
