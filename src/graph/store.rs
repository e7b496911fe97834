// src/graph/store.rs

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::trace;

use super::{PackagePath, PackageRoots};

/// Package -> directory index.
///
/// The scanner is the only writer; build workers read it from their own
/// tasks, so the map sits behind a shared lock while the rest of the graph
/// stays single-owner.
#[derive(Debug, Clone, Default)]
pub struct LocationIndex {
    inner: Arc<RwLock<HashMap<PackagePath, PathBuf>>>,
}

impl LocationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, package: &str, dir: &Path) {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        map.insert(package.to_string(), dir.to_path_buf());
    }

    /// Last known directory of `package`, if it has ever been scanned.
    pub fn get(&self, package: &str) -> Option<PathBuf> {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        map.get(package).cloned()
    }
}

/// In-memory import graph.
///
/// Invariants:
/// - an importer's import list never holds the same target twice;
/// - every forward edge `A -> B` has `A` in `dependents[B]`, even when `B`
///   was never scanned.
#[derive(Debug, Default)]
pub struct GraphStore {
    roots: PackageRoots,
    /// importer -> imported paths, in first-seen order.
    imports: HashMap<PackagePath, Vec<PackagePath>>,
    /// imported path -> importers.
    dependents: HashMap<PackagePath, BTreeSet<PackagePath>>,
    locations: LocationIndex,
}

impl GraphStore {
    pub fn new(roots: PackageRoots) -> Self {
        Self {
            roots,
            ..Self::default()
        }
    }

    pub fn roots(&self) -> &PackageRoots {
        &self.roots
    }

    /// Canonical package path for a directory.
    pub fn package_path(&self, dir: &Path) -> PackagePath {
        self.roots.package_path(dir)
    }

    /// Record that `importer` imports `imported`.
    ///
    /// Returns `true` if the forward edge is new. The dependents index is
    /// updated either way.
    pub fn record_import(&mut self, importer: &str, imported: &str) -> bool {
        let targets = self.imports.entry(importer.to_string()).or_default();
        let added = if targets.iter().any(|t| t == imported) {
            false
        } else {
            targets.push(imported.to_string());
            true
        };

        self.dependents
            .entry(imported.to_string())
            .or_default()
            .insert(importer.to_string());

        if added {
            trace!(importer, imported, "recorded import edge");
        }
        added
    }

    /// Replace every outgoing edge of `importer` with `imported`.
    ///
    /// Dependents entries that only existed because of the old edges are
    /// removed as well.
    pub fn replace_imports<I, S>(&mut self, importer: &str, imported: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(old) = self.imports.remove(importer) {
            for target in old {
                if let Some(set) = self.dependents.get_mut(&target) {
                    set.remove(importer);
                    if set.is_empty() {
                        self.dependents.remove(&target);
                    }
                }
            }
        }

        // An importer with no imports is still a known node.
        self.imports.entry(importer.to_string()).or_default();
        for target in imported {
            self.record_import(importer, target.as_ref());
        }
    }

    /// Imports recorded for `importer`, in first-seen order.
    pub fn imports_of(&self, importer: &str) -> &[PackagePath] {
        self.imports
            .get(importer)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Packages that directly import `path`, sorted lexicographically.
    pub fn dependents_of(&self, path: &str) -> Vec<PackagePath> {
        self.dependents
            .get(path)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Packages reachable from `path` within `depth` hops of the dependents
    /// index.
    ///
    /// Ordered by hop, lexicographically within a hop. `path` itself is never
    /// part of the result. `depth == 1` yields the immediate dependents.
    pub fn dependents_within(&self, path: &str, depth: usize) -> Vec<PackagePath> {
        let mut seen: HashSet<&str> = HashSet::from([path]);
        let mut frontier: Vec<&str> = vec![path];
        let mut out = Vec::new();

        for _ in 0..depth {
            let mut next: BTreeSet<&str> = BTreeSet::new();
            for pkg in &frontier {
                if let Some(set) = self.dependents.get(*pkg) {
                    next.extend(
                        set.iter()
                            .map(String::as_str)
                            .filter(|d| !seen.contains(d)),
                    );
                }
            }
            if next.is_empty() {
                break;
            }

            seen.extend(next.iter().copied());
            out.extend(next.iter().map(|s| s.to_string()));
            frontier = next.into_iter().collect();
        }

        out
    }

    pub fn set_location(&mut self, package: &str, dir: &Path) {
        self.locations.insert(package, dir);
    }

    /// Last known directory of `package`.
    pub fn location_of(&self, package: &str) -> Option<PathBuf> {
        self.locations.get(package)
    }

    /// Shared read handle on the location index, for build workers.
    pub fn locations(&self) -> LocationIndex {
        self.locations.clone()
    }

    /// All forward edges, keyed by importer.
    pub fn imports(&self) -> impl Iterator<Item = (&PackagePath, &Vec<PackagePath>)> {
        self.imports.iter()
    }

    /// Dependents index as a sorted map, for diagnostics output.
    pub fn dependents_map(&self) -> BTreeMap<&str, Vec<&str>> {
        self.dependents
            .iter()
            .map(|(k, v)| (k.as_str(), v.iter().map(String::as_str).collect()))
            .collect()
    }
}
