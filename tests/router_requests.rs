// tests/router_requests.rs

mod common;
use crate::common::init_tracing;

use autotest::types::{BuildRequest, RequestKind};
use autotest_test_utils::builders::{go_source, SourceTreeBuilder};

fn lib_app_tree() -> autotest_test_utils::builders::SourceTree {
    SourceTreeBuilder::new("/go/src")
        .package("lib", &[])
        .package("app", &["lib"])
        .package("cmd", &["app"])
        .build()
}

#[test]
fn change_in_lib_requests_lib_then_its_dependents() {
    init_tracing();

    let tree = lib_app_tree();
    let mut router = tree.router(1);

    let requests = router.route(&tree.dir("lib").join("lib.go"));

    assert_eq!(
        requests,
        vec![BuildRequest::direct("lib"), BuildRequest::implied("app")]
    );
}

#[test]
fn only_one_hop_of_dependents_by_default() {
    let tree = lib_app_tree();
    let mut router = tree.router(1);

    let requests = router.route(&tree.dir("lib").join("lib.go"));

    assert!(!requests.iter().any(|r| r.package == "cmd"));
}

#[test]
fn deeper_propagation_walks_further_dependents() {
    let tree = lib_app_tree();
    let mut router = tree.router(2);

    let requests = router.route(&tree.dir("lib").join("lib.go"));

    assert_eq!(
        requests,
        vec![
            BuildRequest::direct("lib"),
            BuildRequest::implied("app"),
            BuildRequest::implied("cmd"),
        ]
    );
}

#[test]
fn editor_temporaries_produce_no_requests() {
    let tree = lib_app_tree();
    let mut router = tree.router(1);

    for name in ["flycheck_lib.go", ".#lib.go", "#lib.go#", "lib.go~"] {
        assert!(
            router.route(&tree.dir("lib").join(name)).is_empty(),
            "{name} should be ignored"
        );
    }
}

#[test]
fn new_import_is_picked_up_by_the_rescan() {
    let tree = lib_app_tree();
    let mut router = tree.router(1);

    tree.fs.add_file(
        tree.dir("tool").join("tool.go"),
        go_source("tool", &["lib"]),
    );
    let requests = router.route(&tree.dir("tool").join("tool.go"));
    assert_eq!(requests, vec![BuildRequest::direct("tool")]);

    let requests = router.route(&tree.dir("lib").join("lib.go"));
    let implied: Vec<&str> = requests
        .iter()
        .filter(|r| r.kind == RequestKind::Implied)
        .map(|r| r.package.as_str())
        .collect();
    assert_eq!(implied, vec!["app", "tool"]);
}

#[test]
fn failed_rescan_still_routes_from_the_existing_graph() {
    init_tracing();

    let tree = lib_app_tree();
    let mut router = tree.router(1);

    // Directory vanished between the event and the re-scan.
    tree.fs.remove(tree.dir("lib"));

    let requests = router.route(&tree.dir("lib").join("lib.go"));
    assert_eq!(
        requests,
        vec![BuildRequest::direct("lib"), BuildRequest::implied("app")]
    );
}

#[test]
fn change_to_a_new_subdirectory_is_a_request_for_the_parent() {
    let tree = lib_app_tree();
    let mut router = tree.router(1);

    tree.fs.add_dir(tree.dir("lib/sub"));
    let requests = router.route(&tree.dir("lib/sub"));

    assert_eq!(
        requests,
        vec![BuildRequest::direct("lib"), BuildRequest::implied("app")]
    );
    // The re-scan of lib reached the new directory.
    assert_eq!(router.graph().location_of("lib/sub"), Some(tree.dir("lib/sub")));
}
