// src/watch/router.rs

//! Turns raw change notifications into build requests.

use std::path::Path;

use tracing::{debug, trace, warn};

use crate::graph::GraphStore;
use crate::types::BuildRequest;
use crate::watch::patterns::IgnoreSet;
use crate::watch::scanner::TreeScanner;

/// Owns the graph and the scanner that keeps it current.
#[derive(Debug)]
pub struct ChangeRouter {
    graph: GraphStore,
    scanner: TreeScanner,
    ignore: IgnoreSet,
    propagation_depth: usize,
}

impl ChangeRouter {
    /// `propagation_depth` is the number of dependents hops to rebuild;
    /// values below 1 are treated as 1.
    pub fn new(
        graph: GraphStore,
        scanner: TreeScanner,
        ignore: IgnoreSet,
        propagation_depth: usize,
    ) -> Self {
        Self {
            graph,
            scanner,
            ignore,
            propagation_depth: propagation_depth.max(1),
        }
    }

    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    /// Handle one change notification for `path`.
    ///
    /// Returns the direct request for the containing package followed by
    /// implied requests for its dependents, or nothing if the file name is
    /// ignored. A failed re-scan is logged and the requests are still
    /// derived from the graph as it stands.
    pub fn route(&mut self, path: &Path) -> Vec<BuildRequest> {
        if self.ignore.is_ignored_path(path) {
            trace!(path = ?path, "ignoring change to editor temporary");
            return Vec::new();
        }

        let Some(dir) = path.parent() else {
            return Vec::new();
        };

        if let Err(err) = self.scanner.scan(&mut self.graph, dir) {
            warn!(dir = ?dir, error = %err, "re-scan failed; using existing graph");
        }

        let package = self.graph.package_path(dir);
        let dependents = self
            .graph
            .dependents_within(&package, self.propagation_depth);

        debug!(package = %package, ?dependents, "change routed");

        let mut requests = Vec::with_capacity(dependents.len() + 1);
        requests.push(BuildRequest::direct(package));
        requests.extend(dependents.into_iter().map(BuildRequest::implied));
        requests
    }
}
