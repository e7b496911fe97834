// src/watch/scanner.rs

//! Tree scanner: walks a source directory, feeds every import it finds into
//! the [`GraphStore`] and registers each visited directory with the watcher.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::errors::{AutotestError, Result};
use crate::fs::FileSystem;
use crate::graph::GraphStore;
use crate::source::ImportExtractor;
use crate::types::StaleEdgePolicy;
use crate::watch::patterns::IgnoreSet;
use crate::watch::watcher::WatchRegistrar;

/// Counters for a single [`TreeScanner::scan`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Directories read and registered.
    pub dirs: usize,
    /// Source files handed to the import extractor.
    pub files: usize,
    /// Source files whose imports could not be extracted.
    pub unparsable: usize,
    /// Forward edges that were not in the graph before this scan.
    pub new_edges: usize,
}

pub struct TreeScanner {
    fs: Arc<dyn FileSystem>,
    extractor: Arc<dyn ImportExtractor>,
    registrar: Box<dyn WatchRegistrar>,
    ignore: IgnoreSet,
    skip_dirs: IgnoreSet,
    stale_edges: StaleEdgePolicy,
}

impl std::fmt::Debug for TreeScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeScanner")
            .field("extractor", &self.extractor)
            .field("stale_edges", &self.stale_edges)
            .finish_non_exhaustive()
    }
}

impl TreeScanner {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        extractor: Arc<dyn ImportExtractor>,
        registrar: Box<dyn WatchRegistrar>,
    ) -> Self {
        Self {
            fs,
            extractor,
            registrar,
            ignore: IgnoreSet::editor_defaults(),
            skip_dirs: IgnoreSet::empty(),
            stale_edges: StaleEdgePolicy::default(),
        }
    }

    /// File names that are never parsed (editor temporaries).
    pub fn with_ignore(mut self, ignore: IgnoreSet) -> Self {
        self.ignore = ignore;
        self
    }

    /// Directory names that are never descended into.
    pub fn with_skip_dirs(mut self, skip_dirs: IgnoreSet) -> Self {
        self.skip_dirs = skip_dirs;
        self
    }

    pub fn with_stale_edges(mut self, policy: StaleEdgePolicy) -> Self {
        self.stale_edges = policy;
        self
    }

    /// Scan `dir` and everything below it.
    ///
    /// Safe to repeat. The first directory that cannot be read or watched
    /// aborts the scan and is returned as the error; edges recorded before
    /// that point stay in the graph.
    pub fn scan(&mut self, graph: &mut GraphStore, dir: &Path) -> Result<ScanSummary> {
        info!(dir = ?dir, "scanning");
        let mut summary = ScanSummary::default();
        self.scan_dir(graph, dir, &mut summary)?;
        debug!(
            dir = ?dir,
            dirs = summary.dirs,
            files = summary.files,
            unparsable = summary.unparsable,
            new_edges = summary.new_edges,
            "scan finished"
        );
        Ok(summary)
    }

    fn scan_dir(
        &mut self,
        graph: &mut GraphStore,
        dir: &Path,
        summary: &mut ScanSummary,
    ) -> Result<()> {
        let package = graph.package_path(dir);
        trace!(dir = ?dir, package = %package, "process");

        self.registrar
            .register(dir)
            .map_err(|e| AutotestError::WatchError {
                dir: dir.to_path_buf(),
                message: format!("{e:#}"),
            })?;

        let entries = self.fs.read_dir(dir).map_err(|e| AutotestError::ScanError {
            dir: dir.to_path_buf(),
            message: format!("{e:#}"),
        })?;

        graph.set_location(&package, dir);
        summary.dirs += 1;

        let mut imports: Vec<String> = Vec::new();
        let mut subdirs: Vec<PathBuf> = Vec::new();

        for entry in entries {
            let Some(name) = entry.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };

            if self.extractor.is_source(&name) && self.fs.is_file(&entry) {
                if self.ignore.is_ignored(&name) {
                    trace!(file = ?entry, "skipping ignored source file");
                    continue;
                }
                summary.files += 1;
                match self.extractor.imports(self.fs.as_ref(), &entry) {
                    Ok(list) => imports.extend(list),
                    Err(err) => {
                        summary.unparsable += 1;
                        debug!(error = %err, "skipping unparsable source file");
                    }
                }
            } else if self.fs.is_dir(&entry) {
                // Linked directories are not descended; a link back to an
                // ancestor would otherwise recurse until ELOOP.
                if self.fs.is_symlink(&entry) {
                    trace!(dir = ?entry, "skipping symlinked directory");
                    continue;
                }
                if self.skip_dirs.is_ignored(&name) {
                    trace!(dir = ?entry, "skipping directory");
                    continue;
                }
                subdirs.push(entry);
            }
        }

        summary.new_edges += self.apply_imports(graph, &package, imports);

        for sub in subdirs {
            self.scan_dir(graph, &sub, summary)?;
        }

        Ok(())
    }

    /// Returns the number of forward edges that did not exist before.
    fn apply_imports(&self, graph: &mut GraphStore, package: &str, imports: Vec<String>) -> usize {
        match self.stale_edges {
            StaleEdgePolicy::Keep => imports
                .iter()
                .filter(|target| graph.record_import(package, target))
                .count(),
            StaleEdgePolicy::Prune => {
                let before: HashSet<String> = graph.imports_of(package).iter().cloned().collect();
                graph.replace_imports(package, &imports);
                graph
                    .imports_of(package)
                    .iter()
                    .filter(|target| !before.contains(*target))
                    .count()
            }
        }
    }
}
