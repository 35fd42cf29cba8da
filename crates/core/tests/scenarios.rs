// End-to-end behaviour through the public API
use codemap_core::{
    deep_clean, extract, reconcile, Config, MapScanner, Region, RootConfig, LEVEL_FILES,
    MAP_SUFFIX,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;

fn spans(regions: &[Region]) -> Vec<(usize, usize, String)> {
    regions.iter().map(|r| (r.start, r.end, r.label())).collect()
}

fn count_sidecars(dir: &Path) -> usize {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(MAP_SUFFIX))
        .count()
}

#[test]
fn test_one_line_function() {
    let extraction = extract("function foo() { return 1; }", ".js");
    assert_eq!(spans(&extraction.regions), vec![(1, 1, "ƒ foo".to_string())]);
}

#[test]
fn test_nested_method_is_qualified() {
    let source = "class Widget {\n  method() {\n    return 1;\n  }\n}\n";
    let extraction = extract(source, ".js");
    assert_eq!(
        spans(&extraction.regions),
        vec![
            (1, 5, "📦 Widget".to_string()),
            (2, 4, "ƒ Widget.method".to_string()),
        ]
    );
}

#[test]
fn test_unqualified_without_container() {
    let source = "function outer() {\n  function inner() {\n  }\n}\n";
    let extraction = extract(source, ".js");
    let labels: Vec<String> = extraction.regions.iter().map(Region::label).collect();
    assert_eq!(labels, vec!["ƒ outer".to_string(), "ƒ inner".to_string()]);
}

#[test]
fn test_indentation_scopes() {
    let source = "class A:\n    def m(self):\n        a = 1\n        return a\nx = A()\n";
    let extraction = extract(source, ".py");
    assert_eq!(
        spans(&extraction.regions),
        vec![(1, 4, "📦 A".to_string()), (2, 4, "ƒ A.m".to_string())]
    );
}

#[test]
fn test_markdown_headings() {
    let mut lines: Vec<String> = (1..=20).map(|n| format!("line {}", n)).collect();
    lines[0] = "# One".to_string();
    lines[4] = "## Two".to_string();
    lines[11] = "## Three".to_string();
    let extraction = extract(&lines.join("\n"), ".md");
    let ranges: Vec<(usize, usize)> = extraction.regions.iter().map(|r| (r.start, r.end)).collect();
    assert_eq!(ranges, vec![(1, 4), (5, 11), (12, 20)]);
    assert_eq!(extraction.line_count, 20);
}

#[test]
fn test_region_invariants_across_dialects() {
    let samples = [
        (
            ".ts",
            "import { a } from './a';\nexport class Store {\n  get(id) {\n    return this.items[id];\n  }\n  set(id, v) { this.items[id] = v; }\n}\ndescribe('store', () => {\n  it('gets', () => {\n  });\n});\n",
        ),
        (
            ".go",
            "package x\n\nimport (\n\t\"os\"\n)\n\ntype S struct {\n\tA int\n}\n\nfunc (s *S) Run() {\n\tif true {\n\t}\n}\n",
        ),
        (
            ".py",
            "import os\n\n\nclass K:\n    def a(self):\n        pass\n\n    def b(self):\n        pass\n\ndef top():\n    return 1\n",
        ),
        (
            ".html",
            "<body>\n<header id=\"top\">\n</header>\n<main>\n  <div class=\"x\">\n  </div>\n</main>\n</body>\n",
        ),
        (".rs", "// #region api\npub struct A {\n}\n// 2. impls\nimpl A {\n    fn f() {}\n}\n"),
    ];

    for (ext, source) in samples {
        let extraction = extract(source, ext);
        let regions = &extraction.regions;
        assert!(!regions.is_empty(), "no regions for {}", ext);
        assert!(regions.windows(2).all(|w| w[0].start <= w[1].start), "{}", ext);
        for region in regions {
            assert!(region.start >= 1 && region.start <= region.end, "{:?}", region);
            assert!(region.end <= extraction.line_count, "{:?}", region);
        }
        for outer in regions.iter().filter(|r| !r.kind.is_point()) {
            for inner in regions.iter().filter(|r| !r.kind.is_point()) {
                if outer.start < inner.start && inner.start <= outer.end {
                    assert!(inner.end <= outer.end, "{:?} overlaps {:?}", outer, inner);
                }
            }
        }
        assert_eq!(extract(source, ext), extraction, "not idempotent for {}", ext);
    }
}

#[test]
fn test_reconcile_removes_deleted_source_only() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("repo");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("a.go"), "package a\n\nfunc A() {\n}\n").unwrap();
    fs::write(root.join("b.go"), "package a\n\nfunc B() {\n}\n").unwrap();

    let config = Config::new(vec![RootConfig::new(&root, vec![".go".to_string()])]);
    let scanner = MapScanner::new(config.clone()).unwrap();
    scanner.scan(&root).unwrap();
    assert!(root.join("a.go.map.txt").exists());

    fs::remove_file(root.join("a.go")).unwrap();
    assert_eq!(reconcile(&config).unwrap(), 1);

    assert!(!root.join("a.go.map.txt").exists());
    assert!(root.join("b.go.map.txt").exists());
    for name in LEVEL_FILES {
        assert!(root.join(name).exists());
    }
}

#[test]
fn test_deep_clean_removes_every_sidecar() {
    let dir = TempDir::new().unwrap();
    for n in 0..50 {
        let nested = dir
            .path()
            .join(format!("l1_{}", n % 5))
            .join(format!("l2_{}", n % 3))
            .join("l3");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join(format!("f{}.js{}", n, MAP_SUFFIX)), "x").unwrap();
        fs::write(nested.join(format!("f{}.js", n)), "x").unwrap();
    }
    assert_eq!(count_sidecars(dir.path()), 50);

    assert_eq!(deep_clean(dir.path()), 50);
    assert_eq!(count_sidecars(dir.path()), 0);
}

#[test]
fn test_scan_writes_sidecars_and_rollups() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("web");
    fs::create_dir_all(root.join("styles")).unwrap();
    fs::write(
        root.join("index.html"),
        "<body>\n  <nav class=\"main-nav\">\n  </nav>\n  <script src=\"app.js\"></script>\n</body>\n",
    )
    .unwrap();
    fs::write(root.join("styles/site.css"), "@import 'base.css';\n.card {\n  color: red;\n}\n")
        .unwrap();

    let config = Config::new(vec![RootConfig::new(
        &root,
        vec![".html".to_string(), ".css".to_string()],
    )]);
    let report = MapScanner::new(config).unwrap().scan(&root).unwrap();
    assert_eq!(report.files_mapped, 2);
    assert_eq!(report.directories, 2);

    let html = fs::read_to_string(root.join("index.html.map.txt")).unwrap();
    assert!(html.starts_with("File: index.html\n"));
    assert!(html.contains("|    1 |    5 | <body>\n"));
    assert!(html.contains("|    2 |    3 | <nav> .main-nav\n"));
    assert!(html.contains("|    4 |    4 | 🔗 depends on: app.js\n|    4 |    4 | <script>\n"));

    let level1 = fs::read_to_string(root.join("styles").join(LEVEL_FILES[1])).unwrap();
    assert!(level1.contains("### site.css\n"));
    assert!(level1.contains("|    1 |    1 | 🔗 depends on: base.css\n"));
    assert!(level1.contains("|    2 |    4 | 🎨 .card\n"));

    let level3 = fs::read_to_string(root.join(LEVEL_FILES[3])).unwrap();
    assert!(level3.contains("- 📄 index.html\n"));
    assert!(level3.contains("- 📁 styles/\n  - 📄 site.css\n"));
    assert!(!level3.contains(MAP_SUFFIX));
}
