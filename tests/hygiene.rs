//! Source hygiene: scans `src/` (test files excluded) for patterns that
//! crash the host or drop errors on the floor. Every budget is zero; a hit
//! has to be fixed, not the budget raised.

use std::fs;
use std::path::Path;

/// `(pattern, budget, why)`.
const RULES: &[(&str, usize, &str)] = &[
    (".unwrap()", 0, "panics on None/Err"),
    (".expect(", 0, "panics on None/Err"),
    ("panic!(", 0, "aborts the frame loop"),
    ("unreachable!(", 0, "aborts the frame loop"),
    ("todo!(", 0, "unfinished stub"),
    ("unimplemented!(", 0, "unfinished stub"),
    ("let _ =", 0, "discards a result without inspecting it"),
    (".ok()", 0, "discards the error value"),
    ("#[allow(dead_code)]", 0, "hides unused code"),
];

struct SourceFile {
    path: String,
    content: String,
}

fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect(Path::new("src"), &mut files);
    files
}

fn collect(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(&path, out);
            continue;
        }
        let path_str = path.to_string_lossy().to_string();
        if !path_str.ends_with(".rs") || path_str.ends_with("_test.rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path: path_str, content });
        }
    }
}

fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file.content.lines().filter(|line| line.contains(pattern)).count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

#[test]
fn scan_finds_sources() {
    let files = source_files();
    assert!(files.iter().any(|f| f.path.ends_with("engine.rs")));
    assert!(files.iter().all(|f| !f.path.ends_with("_test.rs")));
}

#[test]
fn pattern_budgets_hold() {
    let files = source_files();
    let mut report = Vec::new();
    for (pattern, budget, why) in RULES {
        let found = hits(&files, pattern);
        let total: usize = found.iter().map(|(_, c)| c).sum();
        if total > *budget {
            report.push(format!("{pattern} ({why}): found {total}, max {budget}"));
            report.extend(found.iter().map(|(path, count)| format!("  {path}: {count}")));
        }
    }
    assert!(report.is_empty(), "hygiene budgets exceeded:\n{}", report.join("\n"));
}
