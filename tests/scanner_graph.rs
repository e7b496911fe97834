// tests/scanner_graph.rs

mod common;
use crate::common::init_tracing;

use std::path::Path;

use autotest::errors::AutotestError;
use autotest::fs::FileSystem;
use autotest::types::StaleEdgePolicy;
use autotest::watch::NullRegistrar;
use autotest_test_utils::builders::{go_source, RecordingRegistrar, SourceTreeBuilder};

#[test]
fn scan_builds_forward_and_reverse_edges() {
    init_tracing();

    let tree = SourceTreeBuilder::new("/go/src")
        .package("lib", &["fmt"])
        .package("app", &["lib", "fmt"])
        .package("github.com/acme/tool", &["lib"])
        .build();

    let graph = tree.scanned_graph();

    assert_eq!(graph.imports_of("app"), &["lib".to_string(), "fmt".to_string()]);
    assert_eq!(graph.dependents_of("lib"), vec!["app", "github.com/acme/tool"]);
    assert_eq!(graph.dependents_of("fmt"), vec!["app", "lib"]);

    // Every forward edge has its mirror.
    for (importer, targets) in graph.imports() {
        for target in targets {
            assert!(graph.dependents_of(target).contains(importer));
        }
    }

    assert_eq!(graph.location_of("app"), Some(tree.dir("app")));
    assert_eq!(
        graph.location_of("github.com/acme/tool"),
        Some(tree.dir("github.com/acme/tool"))
    );
}

#[test]
fn rescanning_an_unchanged_tree_adds_nothing() {
    init_tracing();

    let tree = SourceTreeBuilder::new("/go/src")
        .package("lib", &[])
        .package("app", &["lib"])
        .build();

    let mut graph = tree.empty_graph();
    let mut scanner = tree.scanner(Box::new(NullRegistrar));

    let first = scanner.scan(&mut graph, &tree.root).unwrap();
    let before = graph.dependents_map().len();
    let second = scanner.scan(&mut graph, &tree.root).unwrap();

    assert_eq!(first.new_edges, 1);
    assert_eq!(second.new_edges, 0);
    assert_eq!(graph.imports_of("app"), &["lib".to_string()]);
    assert_eq!(graph.dependents_map().len(), before);
}

#[test]
fn unparsable_file_is_skipped_and_directory_still_located() {
    init_tracing();

    let tree = SourceTreeBuilder::new("/go/src")
        .package("lib", &[])
        .file("app", "app.go", &go_source("app", &["lib"]))
        .file("app", "broken.go", "package app\nimport (\n\t\"net\"\n")
        .build();

    let mut graph = tree.empty_graph();
    let mut scanner = tree.scanner(Box::new(NullRegistrar));
    let summary = scanner.scan(&mut graph, &tree.root).unwrap();

    assert_eq!(summary.unparsable, 1);
    assert_eq!(graph.imports_of("app"), &["lib".to_string()]);
    assert_eq!(graph.location_of("app"), Some(tree.dir("app")));
}

#[test]
fn every_visited_directory_is_registered_once_per_scan() {
    let tree = SourceTreeBuilder::new("/go/src")
        .package("lib", &[])
        .package("lib/internal", &[])
        .dir("empty")
        .build();

    let registrar = RecordingRegistrar::default();
    let mut graph = tree.empty_graph();
    let mut scanner = tree.scanner(Box::new(registrar.clone()));
    scanner.scan(&mut graph, &tree.root).unwrap();

    for dir in ["", "lib", "lib/internal", "empty"] {
        let path = if dir.is_empty() { tree.root.clone() } else { tree.dir(dir) };
        assert_eq!(registrar.count(&path), 1, "{path:?}");
    }
}

#[test]
fn version_control_directories_are_not_descended() {
    let tree = SourceTreeBuilder::new("/go/src")
        .package("lib", &[])
        .file("lib/.git", "hook.go", &go_source("hook", &["os"]))
        .build();

    let registrar = RecordingRegistrar::default();
    let mut graph = tree.empty_graph();
    let mut scanner = tree
        .scanner(Box::new(registrar.clone()))
        .with_skip_dirs(autotest::watch::IgnoreSet::new(&[".git"]).unwrap());
    scanner.scan(&mut graph, &tree.root).unwrap();

    assert!(graph.dependents_of("os").is_empty());
    assert_eq!(registrar.count(&tree.dir("lib/.git")), 0);
}

#[test]
fn missing_directory_is_a_scan_error() {
    let tree = SourceTreeBuilder::new("/go/src").build();
    let mut graph = tree.empty_graph();
    let mut scanner = tree.scanner(Box::new(NullRegistrar));

    let err = scanner
        .scan(&mut graph, Path::new("/go/src/nowhere"))
        .unwrap_err();

    assert!(matches!(err, AutotestError::ScanError { dir, .. } if dir == Path::new("/go/src/nowhere")));
}

#[test]
fn registration_failure_aborts_the_scan() {
    let tree = SourceTreeBuilder::new("/go/src")
        .package("a", &[])
        .package("b", &["a"])
        .build();

    let mut graph = tree.empty_graph();
    let mut scanner = tree.scanner(Box::new(RecordingRegistrar::failing_on(tree.dir("b"))));

    let err = scanner.scan(&mut graph, &tree.root).unwrap_err();
    assert!(matches!(err, AutotestError::WatchError { .. }));
    // `a` sorts first and was already processed.
    assert_eq!(graph.location_of("a"), Some(tree.dir("a")));
    assert_eq!(graph.location_of("b"), None);
}

#[test]
fn stale_edges_are_kept_by_default_and_pruned_on_request() {
    let tree = SourceTreeBuilder::new("/go/src")
        .package("lib", &[])
        .package("old", &[])
        .package("app", &["lib", "old"])
        .build();

    let mut kept = tree.empty_graph();
    let mut keep_scanner = tree.scanner(Box::new(NullRegistrar));
    keep_scanner.scan(&mut kept, &tree.root).unwrap();

    let mut pruned = tree.empty_graph();
    let mut prune_scanner = tree.scanner_with_policy(Box::new(NullRegistrar), StaleEdgePolicy::Prune);
    prune_scanner.scan(&mut pruned, &tree.root).unwrap();

    // app stops importing "old".
    tree.fs
        .add_file(tree.dir("app").join("app.go"), go_source("app", &["lib"]));

    keep_scanner.scan(&mut kept, &tree.dir("app")).unwrap();
    prune_scanner.scan(&mut pruned, &tree.dir("app")).unwrap();

    assert_eq!(kept.dependents_of("old"), vec!["app"]);
    assert!(pruned.dependents_of("old").is_empty());
    assert_eq!(pruned.imports_of("app"), &["lib".to_string()]);
}

#[test]
fn scans_a_real_directory_tree() {
    use autotest::fs::RealFileSystem;
    use std::sync::Arc;

    let tmp = tempfile::tempdir().unwrap();
    let root = RealFileSystem.canonicalize(tmp.path()).unwrap();
    std::fs::create_dir_all(root.join("lib")).unwrap();
    std::fs::create_dir_all(root.join("cmd/app")).unwrap();
    std::fs::write(root.join("lib/lib.go"), go_source("lib", &[])).unwrap();
    std::fs::write(root.join("cmd/app/main.go"), go_source("main", &["lib", "os"])).unwrap();
    std::fs::write(root.join("cmd/app/.#main.go"), "garbage").unwrap();

    let mut graph = autotest::graph::GraphStore::new(autotest::graph::PackageRoots::new([
        root.clone(),
    ]));
    let mut scanner = autotest::watch::TreeScanner::new(
        Arc::new(RealFileSystem),
        Arc::new(autotest::source::GoImportExtractor),
        Box::new(NullRegistrar),
    );
    let summary = scanner.scan(&mut graph, &root).unwrap();

    assert_eq!(summary.unparsable, 0);
    assert_eq!(graph.dependents_of("lib"), vec!["cmd/app"]);
    assert_eq!(graph.location_of("cmd/app"), Some(root.join("cmd/app")));
}

#[cfg(unix)]
#[test]
fn symlink_cycles_do_not_multiply_packages() {
    use autotest::fs::RealFileSystem;
    use std::os::unix::fs::symlink;
    use std::sync::Arc;

    init_tracing();

    let tmp = tempfile::tempdir().unwrap();
    let root = RealFileSystem.canonicalize(tmp.path()).unwrap();
    std::fs::create_dir_all(root.join("lib")).unwrap();
    std::fs::write(root.join("lib/lib.go"), go_source("lib", &["fmt"])).unwrap();
    symlink(&root, root.join("lib/loop")).unwrap();
    symlink(&root, root.join("lib/loop2")).unwrap();

    let registrar = RecordingRegistrar::default();
    let mut graph = autotest::graph::GraphStore::new(autotest::graph::PackageRoots::new([
        root.clone(),
    ]));
    let mut scanner = autotest::watch::TreeScanner::new(
        Arc::new(RealFileSystem),
        Arc::new(autotest::source::GoImportExtractor),
        Box::new(registrar.clone()),
    );
    let summary = scanner.scan(&mut graph, &root).unwrap();

    assert_eq!(summary.dirs, 2);
    assert_eq!(registrar.registered(), vec![root.clone(), root.join("lib")]);
    assert_eq!(graph.location_of("lib"), Some(root.join("lib")));
    assert_eq!(graph.location_of("lib/loop"), None);
    assert_eq!(graph.dependents_of("fmt"), vec!["lib"]);
}
