// src/graph/cycles.rs

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;

use super::{GraphStore, PackagePath};

/// Import cycles in the forward graph.
///
/// Each cycle is the sorted member list of a strongly connected component
/// with more than one package, or a single package importing itself. The
/// outer list is sorted too, so output is stable across runs.
pub fn import_cycles(graph: &GraphStore) -> Vec<Vec<PackagePath>> {
    // Edge direction: importer -> imported.
    let mut g: DiGraphMap<&str, ()> = DiGraphMap::new();

    for (importer, targets) in graph.imports() {
        g.add_node(importer.as_str());
        for target in targets {
            g.add_edge(importer.as_str(), target.as_str(), ());
        }
    }

    let mut cycles: Vec<Vec<PackagePath>> = tarjan_scc(&g)
        .into_iter()
        .filter(|scc| scc.len() > 1 || g.contains_edge(scc[0], scc[0]))
        .map(|scc| {
            let mut members: Vec<PackagePath> = scc.into_iter().map(str::to_string).collect();
            members.sort();
            members
        })
        .collect();
    cycles.sort();
    cycles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PackageRoots;

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let mut g = GraphStore::new(PackageRoots::default());
        g.record_import("app", "lib");
        g.record_import("lib", "fmt");

        assert!(import_cycles(&g).is_empty());
    }

    #[test]
    fn reports_each_cycle_once() {
        let mut g = GraphStore::new(PackageRoots::default());
        g.record_import("a", "b");
        g.record_import("b", "c");
        g.record_import("c", "a");
        g.record_import("self", "self");
        g.record_import("app", "a");

        assert_eq!(
            import_cycles(&g),
            vec![
                vec!["a".to_string(), "b".to_string(), "c".to_string()],
                vec!["self".to_string()],
            ]
        );
    }
}
