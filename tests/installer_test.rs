use std::fs;
use std::path::Path;

use stencil::error::Error;
use stencil::installer::{install, is_text_file};
use stencil::model::{Replacement, DEFINITION_FILE, MATCH_ALL};
use stencil::resolver::ResolvedValues;
use tempfile::TempDir;

fn replacement(original: &str, variable: &str, patterns: &[&str]) -> Replacement {
    Replacement {
        original: original.to_string(),
        variable: variable.to_string(),
        file_patterns: patterns.iter().map(|p| p.to_string()).collect(),
    }
}

fn values(pairs: &[(&str, &str)]) -> ResolvedValues {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn write(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn test_end_to_end_scenario() {
    let source = TempDir::new().unwrap();
    write(source.path(), "index.html", "<h1>Welcome to Acme</h1>");

    let dest_root = TempDir::new().unwrap();
    let output = dest_root.path().join("out");

    let replacements = vec![replacement("Acme", "companyName", &[MATCH_ALL])];
    let resolved = values(&[("companyName", "Globex")]);

    let stats = install(source.path(), &output, &replacements, &resolved, false).unwrap();

    assert_eq!(stats.files_created, 1);
    assert_eq!(stats.files_changed, 1);
    assert_eq!(
        fs::read_to_string(output.join("index.html")).unwrap(),
        "<h1>Welcome to Globex</h1>"
    );
}

#[test]
fn test_literal_match_never_behaves_like_a_pattern() {
    let source = TempDir::new().unwrap();
    write(source.path(), "file.txt", "axb a.b ayb");

    let dest_root = TempDir::new().unwrap();
    let output = dest_root.path().join("out");

    let replacements = vec![replacement("a.b", "dotted", &[MATCH_ALL])];
    let resolved = values(&[("dotted", "X")]);

    install(source.path(), &output, &replacements, &resolved, false).unwrap();
    assert_eq!(fs::read_to_string(output.join("file.txt")).unwrap(), "axb X ayb");
}

#[test]
fn test_multiline_original_is_replaced() {
    let source = TempDir::new().unwrap();
    write(source.path(), "page.html", "<header>\nAcme Inc.\n</header>\nbody");

    let dest_root = TempDir::new().unwrap();
    let output = dest_root.path().join("out");

    let replacements = vec![replacement("<header>\nAcme Inc.\n</header>", "header", &[MATCH_ALL])];
    let resolved = values(&[("header", "<header>Globex</header>")]);

    install(source.path(), &output, &replacements, &resolved, false).unwrap();
    assert_eq!(
        fs::read_to_string(output.join("page.html")).unwrap(),
        "<header>Globex</header>\nbody"
    );
}

#[test]
fn test_replacements_apply_sequentially_in_list_order() {
    let source = TempDir::new().unwrap();
    write(source.path(), "note.md", "Hello");

    let dest_root = TempDir::new().unwrap();
    let output = dest_root.path().join("out");

    // The second replacement matches text produced by the first.
    let replacements = vec![
        replacement("Hello", "greeting", &[MATCH_ALL]),
        replacement("world", "place", &[MATCH_ALL]),
    ];
    let resolved = values(&[("greeting", "Goodbye world"), ("place", "planet")]);

    install(source.path(), &output, &replacements, &resolved, false).unwrap();
    assert_eq!(fs::read_to_string(output.join("note.md")).unwrap(), "Goodbye planet");
}

#[test]
fn test_binary_files_pass_through_byte_identical() {
    let source = TempDir::new().unwrap();
    // PNG signature followed by bytes that are not valid UTF-8.
    let image: Vec<u8> = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0xFF, 0xFE, 0x41];
    fs::write(source.path().join("logo.png"), &image).unwrap();

    let dest_root = TempDir::new().unwrap();
    let output = dest_root.path().join("out");

    let replacements = vec![replacement("A", "letter", &[MATCH_ALL])];
    let resolved = values(&[("letter", "B")]);

    let stats = install(source.path(), &output, &replacements, &resolved, false).unwrap();
    assert_eq!(stats.files_created, 1);
    assert_eq!(stats.files_changed, 0);
    assert_eq!(fs::read(output.join("logo.png")).unwrap(), image);
}

#[test]
fn test_text_extension_with_invalid_utf8_is_copied_untouched() {
    let source = TempDir::new().unwrap();
    let bytes: Vec<u8> = vec![b'A', 0xFF, b'B'];
    fs::write(source.path().join("weird.txt"), &bytes).unwrap();

    let dest_root = TempDir::new().unwrap();
    let output = dest_root.path().join("out");

    let replacements = vec![replacement("A", "letter", &[MATCH_ALL])];
    let resolved = values(&[("letter", "B")]);

    let stats = install(source.path(), &output, &replacements, &resolved, false).unwrap();
    assert_eq!(stats.files_changed, 0);
    assert_eq!(fs::read(output.join("weird.txt")).unwrap(), bytes);
}

#[test]
fn test_excluded_names_are_skipped_entirely() {
    let source = TempDir::new().unwrap();
    write(source.path(), "kept.txt", "hello");
    write(source.path(), DEFINITION_FILE, "NAME \"x\"");
    write(source.path(), "node_modules/pkg/index.js", "module");
    write(source.path(), ".git/HEAD", "ref: refs/heads/main");
    write(source.path(), "vendor/lib.js", "vendored");

    let dest_root = TempDir::new().unwrap();
    let output = dest_root.path().join("out");

    let stats = install(source.path(), &output, &[], &ResolvedValues::new(), false).unwrap();

    assert_eq!(stats.files_created, 1);
    assert!(output.join("kept.txt").exists());
    assert!(!output.join(DEFINITION_FILE).exists());
    assert!(!output.join("node_modules").exists());
    assert!(!output.join(".git").exists());
    assert!(!output.join("vendor").exists());
}

#[test]
fn test_nested_directories_are_mirrored() {
    let source = TempDir::new().unwrap();
    write(source.path(), "a/b/c/deep.md", "Acme");
    write(source.path(), "a/sibling.txt", "Acme");

    let dest_root = TempDir::new().unwrap();
    let output = dest_root.path().join("out");

    let replacements = vec![replacement("Acme", "companyName", &[MATCH_ALL])];
    let resolved = values(&[("companyName", "Globex")]);

    let stats = install(source.path(), &output, &replacements, &resolved, false).unwrap();
    assert_eq!(stats.files_created, 2);
    assert_eq!(stats.files_changed, 2);
    assert_eq!(fs::read_to_string(output.join("a/b/c/deep.md")).unwrap(), "Globex");
}

#[test]
fn test_existing_destination_requires_force() {
    let source = TempDir::new().unwrap();
    write(source.path(), "file.txt", "content");

    let existing = TempDir::new().unwrap();
    let result = install(source.path(), existing.path(), &[], &ResolvedValues::new(), false);
    assert!(matches!(result, Err(Error::OutputDirectoryExists { .. })));

    // With force the same destination is accepted.
    install(source.path(), existing.path(), &[], &ResolvedValues::new(), true).unwrap();
    assert!(existing.path().join("file.txt").exists());
}

#[test]
fn test_missing_source_is_a_preflight_error() {
    let dest_root = TempDir::new().unwrap();
    let result = install(
        Path::new("/nonexistent/template"),
        &dest_root.path().join("out"),
        &[],
        &ResolvedValues::new(),
        false,
    );
    assert!(matches!(result, Err(Error::InvalidTemplate { .. })));
}

#[test]
fn test_unresolved_variables_are_skipped() {
    let source = TempDir::new().unwrap();
    write(source.path(), "file.txt", "Acme");

    let dest_root = TempDir::new().unwrap();
    let output = dest_root.path().join("out");

    let replacements = vec![replacement("Acme", "unresolved", &[MATCH_ALL])];
    let stats = install(source.path(), &output, &replacements, &ResolvedValues::new(), false)
        .unwrap();

    assert_eq!(stats.files_changed, 0);
    assert_eq!(fs::read_to_string(output.join("file.txt")).unwrap(), "Acme");
}

#[test]
fn test_noop_replacements_have_no_effect() {
    let source = TempDir::new().unwrap();
    write(source.path(), "file.txt", "Acme");

    let dest_root = TempDir::new().unwrap();
    let output = dest_root.path().join("out");

    let replacements = vec![replacement("", "companyName", &[MATCH_ALL])];
    let resolved = values(&[("companyName", "Globex")]);

    let stats = install(source.path(), &output, &replacements, &resolved, false).unwrap();
    assert_eq!(stats.files_changed, 0);
}

#[test]
fn test_file_patterns_scope_replacements() {
    let source = TempDir::new().unwrap();
    write(source.path(), "doc.md", "Acme");
    write(source.path(), "page.html", "Acme");

    let dest_root = TempDir::new().unwrap();
    let output = dest_root.path().join("out");

    let replacements = vec![replacement("Acme", "companyName", &["**/*.md"])];
    let resolved = values(&[("companyName", "Globex")]);

    let stats = install(source.path(), &output, &replacements, &resolved, false).unwrap();
    assert_eq!(stats.files_changed, 1);
    assert_eq!(fs::read_to_string(output.join("doc.md")).unwrap(), "Globex");
    assert_eq!(fs::read_to_string(output.join("page.html")).unwrap(), "Acme");
}

#[test]
fn test_applying_twice_produces_identical_trees() {
    let source = TempDir::new().unwrap();
    write(source.path(), "index.html", "<h1>Acme</h1>");
    write(source.path(), "styles/site.css", "h1 { color: #ff0000; }");
    fs::write(source.path().join("logo.png"), [0x89u8, 0x50, 0xFF]).unwrap();

    let dest_root = TempDir::new().unwrap();
    let first = dest_root.path().join("first");
    let second = dest_root.path().join("second");

    let replacements = vec![
        replacement("Acme", "companyName", &[MATCH_ALL]),
        replacement("#ff0000", "primaryColor", &[MATCH_ALL]),
    ];
    let resolved = values(&[("companyName", "Globex"), ("primaryColor", "#00ff00")]);

    let first_stats = install(source.path(), &first, &replacements, &resolved, false).unwrap();
    let second_stats = install(source.path(), &second, &replacements, &resolved, false).unwrap();

    assert_eq!(first_stats, second_stats);
    assert!(!dir_diff::is_different(&first, &second).unwrap());
}

#[test]
fn test_is_text_file_classification() {
    assert!(is_text_file(Path::new("index.html")));
    assert!(is_text_file(Path::new("src/app.TSX")));
    assert!(is_text_file(Path::new(".env")));
    assert!(is_text_file(Path::new(".gitignore")));
    assert!(!is_text_file(Path::new("logo.png")));
    assert!(!is_text_file(Path::new("archive.tar.gz")));
    assert!(!is_text_file(Path::new("Makefile")));
}
