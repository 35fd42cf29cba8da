//! Scope stack for regions awaiting closure

use crate::models::Region;

/// Condition under which an open scope closes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Closure {
    /// Brace depth must return to this enclosing level on a line with `}`
    Brace(isize),
    /// Parenthesis depth must return to this enclosing level on a line with `)`
    Paren(isize),
    /// A non-blank line indented at or below this width
    Indent(usize),
    /// A line with more `</tag>` than `<tag` (lower-case tag name)
    Tag(String),
}

/// The line being examined, with running depths already updated
#[derive(Debug, Clone, Copy)]
pub struct LineView<'a> {
    pub text: &'a str,
    pub number: usize,
    pub brace_depth: isize,
    pub paren_depth: isize,
    /// Last non-blank line before this one
    pub last_content_line: usize,
}

impl Closure {
    /// Whether this line closes a scope opened on an earlier line
    pub fn closes(&self, line: &LineView<'_>) -> bool {
        match self {
            Closure::Brace(level) => line.brace_depth <= *level && line.text.contains('}'),
            Closure::Paren(level) => line.paren_depth <= *level && line.text.contains(')'),
            Closure::Indent(width) => {
                !line.text.trim().is_empty() && leading_width(line.text) <= *width
            }
            Closure::Tag(tag) => {
                let lower = line.text.to_lowercase();
                let closing = lower.matches(&format!("</{}>", tag)).count();
                closing > tag_openings(&lower, tag).len()
            }
        }
    }

    /// Whether the scope closes on the very line that opened it
    ///
    /// Brace scopes also close immediately when the line carries no `{` and
    /// ends in `;` (a declaration without a body).
    pub fn closes_on_opening_line(&self, text: &str) -> bool {
        match self {
            Closure::Brace(_) => match text.find('{') {
                Some(pos) => balances(&text[pos..], '{', '}'),
                None => text.trim_end().ends_with(';'),
            },
            Closure::Paren(_) => text
                .find('(')
                .is_some_and(|pos| balances(&text[pos..], '(', ')')),
            Closure::Indent(_) => false,
            Closure::Tag(tag) => {
                let lower = text.to_lowercase();
                let Some(&open) = tag_openings(&lower, tag).first() else {
                    return false;
                };
                lower[open..].contains(&format!("</{}>", tag))
            }
        }
    }

    /// End line for a scope closed by `line`
    fn end_line(&self, line: &LineView<'_>) -> usize {
        match self {
            // The dedenting line belongs to the outer scope
            Closure::Indent(_) => line.last_content_line,
            _ => line.number,
        }
    }
}

/// A region awaiting closure plus its closure condition
#[derive(Debug, Clone)]
pub struct OpenScope {
    pub region: Region,
    pub closure: Closure,
}

/// Explicit LIFO stack of open scopes, local to one extraction
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<OpenScope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, scope: OpenScope) {
        self.scopes.push(scope);
    }

    pub fn pop(&mut self) -> Option<OpenScope> {
        self.scopes.pop()
    }

    pub fn peek(&self) -> Option<&OpenScope> {
        self.scopes.last()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Identifier of the innermost open container
    pub fn nearest_container(&self) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .find(|s| s.region.kind.is_container())
            .map(|s| s.region.name.as_str())
    }

    /// Close scopes from the innermost outward, stopping at the first that stays open
    pub fn close_matching(&mut self, line: &LineView<'_>) -> Vec<Region> {
        let mut closed = Vec::new();
        while let Some(scope) = self.peek() {
            if !scope.closure.closes(line) {
                break;
            }
            let end = scope.closure.end_line(line);
            if let Some(mut scope) = self.pop() {
                scope.region.end = end.max(scope.region.start);
                closed.push(scope.region);
            }
        }
        closed
    }

    /// Force-close everything left open at end of file
    pub fn drain(&mut self, end: usize) -> Vec<Region> {
        let mut closed = Vec::with_capacity(self.scopes.len());
        while let Some(mut scope) = self.pop() {
            scope.region.end = end.max(scope.region.start);
            closed.push(scope.region);
        }
        closed
    }
}

/// Width of the leading run of spaces and tabs
pub fn leading_width(text: &str) -> usize {
    text.len() - text.trim_start_matches([' ', '\t']).len()
}

/// Byte offsets of `<tag` openings in a lower-cased line, `<tagname-suffix>` excluded
fn tag_openings(lower: &str, tag: &str) -> Vec<usize> {
    let needle = format!("<{}", tag);
    lower
        .match_indices(needle.as_str())
        .map(|(pos, _)| pos)
        .filter(|pos| {
            let rest = &lower[pos + needle.len()..];
            !rest.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '-')
        })
        .collect()
}

/// Whether the bracket opened at the start of `text` is closed within it
fn balances(text: &str, open: char, close: char) -> bool {
    let mut depth = 0isize;
    for ch in text.chars() {
        if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
            if depth <= 0 {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RegionKind;

    fn view(text: &str, number: usize, brace_depth: isize) -> LineView<'_> {
        LineView {
            text,
            number,
            brace_depth,
            paren_depth: 0,
            last_content_line: number.saturating_sub(1),
        }
    }

    fn scope(kind: RegionKind, name: &str, start: usize, closure: Closure) -> OpenScope {
        OpenScope {
            region: Region::new(kind, name, start),
            closure,
        }
    }

    #[test]
    fn test_brace_closure() {
        let closure = Closure::Brace(0);
        assert!(closure.closes(&view("}", 5, 0)));
        assert!(!closure.closes(&view("  }", 4, 1)));
        assert!(!closure.closes(&view("x = 1", 4, 0)));
    }

    #[test]
    fn test_indent_closure_ignores_blank_lines() {
        let closure = Closure::Indent(4);
        assert!(!closure.closes(&view("", 3, 0)));
        assert!(!closure.closes(&view("        pass", 3, 0)));
        assert!(closure.closes(&view("    def other(self):", 3, 0)));
    }

    #[test]
    fn test_tag_closure_case_insensitive() {
        let closure = Closure::Tag("div".to_string());
        assert!(closure.closes(&view("  </DIV>", 9, 0)));
        assert!(!closure.closes(&view("  </span>", 9, 0)));
        assert!(!closure.closes(&view("  <div id=\"b\"></div>", 9, 0)));
        assert!(closure.closes(&view("  <div></div></div>", 9, 0)));
    }

    #[test]
    fn test_same_line_closure() {
        assert!(Closure::Brace(-1).closes_on_opening_line("function foo() { return 1; }"));
        assert!(!Closure::Brace(0).closes_on_opening_line("class Widget {"));
        assert!(Closure::Brace(0).closes_on_opening_line("struct Marker;"));
        assert!(!Closure::Brace(0).closes_on_opening_line("fn long("));
        assert!(Closure::Paren(0).closes_on_opening_line("it('works', () => expect(1).toBe(1));"));
        assert!(!Closure::Paren(0).closes_on_opening_line("describe('suite', () => {"));
        assert!(Closure::Tag("div".to_string()).closes_on_opening_line("<div>hi</div>"));
        assert!(!Closure::Tag("div".to_string()).closes_on_opening_line("</div><div>"));
        assert!(!Closure::Tag("nav".to_string()).closes_on_opening_line("<navbar></nav>"));
    }

    #[test]
    fn test_closes_contiguously_from_innermost() {
        let mut stack = ScopeStack::new();
        stack.push(scope(RegionKind::Type, "Outer", 1, Closure::Brace(0)));
        stack.push(scope(RegionKind::Function, "inner", 2, Closure::Brace(1)));

        let closed = stack.close_matching(&view("  }", 4, 1));
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].name, "inner");
        assert_eq!(closed[0].end, 4);
        assert_eq!(stack.len(), 1);

        let closed = stack.close_matching(&view("}", 5, 0));
        assert_eq!(closed[0].name, "Outer");
        assert!(stack.is_empty());
    }

    #[test]
    fn test_nearest_container() {
        let mut stack = ScopeStack::new();
        assert_eq!(stack.nearest_container(), None);
        stack.push(scope(RegionKind::Type, "Service", 1, Closure::Brace(0)));
        stack.push(scope(RegionKind::Function, "run", 2, Closure::Brace(1)));
        assert_eq!(stack.nearest_container(), Some("Service"));
    }

    #[test]
    fn test_drain_closes_all() {
        let mut stack = ScopeStack::new();
        stack.push(scope(RegionKind::Type, "A", 1, Closure::Indent(0)));
        stack.push(scope(RegionKind::Function, "m", 2, Closure::Indent(4)));
        let closed = stack.drain(10);
        assert_eq!(closed.len(), 2);
        assert!(closed.iter().all(|r| r.end == 10));
        assert!(stack.peek().is_none());
    }
}
