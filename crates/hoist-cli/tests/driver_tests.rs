use super::*;
use clap::Parser;
use std::fs;
use tempfile::TempDir;

const OUTER: &str = "package p;

public class Outer {
    private int x;

    class Inner {
        int read() { return x; }
    }

    Inner make() { return new Inner(); }
}
";

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
    for (path, text) in files {
        let path = dir.path().join(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap_or_else(|e| panic!("mkdir: {e}"));
        }
        fs::write(&path, text).unwrap_or_else(|e| panic!("write: {e}"));
    }
    dir
}

fn invoke(dir: &TempDir, args: &[&str]) -> CommandOutput {
    let root = dir.path().to_string_lossy().to_string();
    let mut argv: Vec<&str> = vec!["hoist"];
    argv.extend_from_slice(args);
    argv.extend_from_slice(&["--root", &root]);
    let args = CliArgs::try_parse_from(argv).unwrap_or_else(|e| panic!("args: {e}"));
    run(&args, false).unwrap_or_else(|e| panic!("run failed: {e:#}"))
}

#[test]
fn discovers_java_sources_in_path_order() {
    let dir = project(&[
        ("src/q/B.java", "package q;\n\nclass B {}\n"),
        ("src/p/A.java", "package p;\n\nclass A {}\n"),
        ("src/p/notes.txt", "not java"),
    ]);
    let files = discover_sources(dir.path()).unwrap_or_else(|e| panic!("{e}"));
    let names: Vec<String> = files
        .iter()
        .map(|f| f.strip_prefix(dir.path()).unwrap_or(f).display().to_string())
        .collect();
    assert_eq!(names, vec!["src/p/A.java", "src/q/B.java"]);
}

#[test]
fn missing_root_is_an_error() {
    let dir = project(&[]);
    assert!(discover_sources(&dir.path().join("absent")).is_err());
}

#[test]
fn move_previews_without_writing() {
    let dir = project(&[("src/p/Outer.java", OUTER)]);
    let output = invoke(&dir, &["move", "p.Outer.Inner"]);
    assert!(!output.failed, "{}", output.text);
    assert!(output.written.is_empty());
    assert!(output.text.contains("+++ "), "{}", output.text);
    assert!(output.text.contains("+    Inner(Outer outer) {"), "{}", output.text);
    assert!(!dir.path().join("src/p/Inner.java").exists());
    assert_eq!(
        fs::read_to_string(dir.path().join("src/p/Outer.java")).unwrap_or_default(),
        OUTER
    );
}

#[test]
fn move_write_updates_files() {
    let dir = project(&[("src/p/Outer.java", OUTER)]);
    let output = invoke(&dir, &["move", "p.Outer.Inner", "--write"]);
    assert!(!output.failed, "{}", output.text);
    assert_eq!(output.written.len(), 2);

    let inner = fs::read_to_string(dir.path().join("src/p/Inner.java"))
        .unwrap_or_else(|e| panic!("Inner.java: {e}"));
    assert!(inner.starts_with("package p;\n\nclass Inner {"), "{inner}");
    let outer = fs::read_to_string(dir.path().join("src/p/Outer.java"))
        .unwrap_or_else(|e| panic!("Outer.java: {e}"));
    assert!(outer.contains("return new Inner(this);"), "{outer}");
    assert!(!outer.contains("class Inner"), "{outer}");
}

#[test]
fn fatal_move_fails_and_writes_nothing() {
    let dir = project(&[("src/p/Outer.java", OUTER)]);
    let output = invoke(&dir, &["move", "p.Outer", "--write"]);
    assert!(output.failed);
    assert!(output.written.is_empty());
    assert!(output.text.contains("fatal HOIST"), "{}", output.text);
}

#[test]
fn move_json_report() {
    let dir = project(&[("src/p/Outer.java", OUTER)]);
    let output = invoke(&dir, &["--format", "json", "move", "p.Outer.Inner"]);
    let value: serde_json::Value =
        serde_json::from_str(&output.text).unwrap_or_else(|e| panic!("json: {e}"));
    let changes = value["changes"].as_array().unwrap_or_else(|| panic!("changes"));
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[1]["kind"], "create");
}

#[test]
fn unknown_type_is_an_error() {
    let dir = project(&[("src/p/Outer.java", OUTER)]);
    let root = dir.path().to_string_lossy().to_string();
    let args = CliArgs::try_parse_from(["hoist", "move", "p.Nope", "--root", &root])
        .unwrap_or_else(|e| panic!("args: {e}"));
    let error = run(&args, false).err().unwrap_or_else(|| panic!("unknown type accepted"));
    assert!(error.to_string().contains("p.Nope"));
}

#[test]
fn visibility_lists_adjustments() {
    let dir = project(&[
        ("src/p/A.java", "package p;\n\npublic class A {\n    int count;\n}\n"),
        (
            "src/q/B.java",
            "package q;\n\nimport p.A;\n\nclass B {\n    int read(A a) { return a.count; }\n}\n",
        ),
    ]);
    let output = invoke(&dir, &["visibility", "p.A#count", "--incoming"]);
    assert!(output.text.contains("A.count: package -> public"), "{}", output.text);
}

#[test]
fn symbols_lists_source_declarations() {
    let dir = project(&[("src/p/Outer.java", OUTER)]);
    let output = invoke(&dir, &["symbols"]);
    for name in ["p.Outer", "p.Outer.Inner", "p.Outer#x", "p.Outer#make"] {
        assert!(output.text.lines().any(|l| l.ends_with(name)), "missing {name}:\n{}", output.text);
    }
    assert!(!output.text.contains("java.lang.String"));
}

#[test]
fn bad_config_is_reported() {
    let dir = project(&[("hoist.json", "{ not json")]);
    assert!(load_config(Some(&dir.path().join("hoist.json"))).is_err());
    assert!(load_config(None).is_ok());
}
