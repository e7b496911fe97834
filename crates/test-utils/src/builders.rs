#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use autotest::config::{ConfigFile, RawConfigFile};
use autotest::fs::mock::MockFileSystem;
use autotest::fs::FileSystem;
use autotest::graph::{GraphStore, PackageRoots};
use autotest::source::GoImportExtractor;
use autotest::types::StaleEdgePolicy;
use autotest::watch::{ChangeRouter, IgnoreSet, TreeScanner, WatchRegistrar};

/// Go source for a package `name` importing `imports`.
pub fn go_source(name: &str, imports: &[&str]) -> String {
    let mut src = format!("package {name}\n\n");
    match imports {
        [] => {}
        [single] => src.push_str(&format!("import \"{single}\"\n")),
        many => {
            src.push_str("import (\n");
            for imp in many {
                src.push_str(&format!("\t\"{imp}\"\n"));
            }
            src.push_str(")\n");
        }
    }
    src.push_str("\nfunc init() {}\n");
    src
}

/// Builder for an in-memory Go source tree under a single root.
///
/// ```ignore
/// let tree = SourceTreeBuilder::new("/go/src")
///     .package("lib", &[])
///     .package("app", &["lib"])
///     .build();
/// ```
pub struct SourceTreeBuilder {
    root: PathBuf,
    fs: MockFileSystem,
}

impl SourceTreeBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let fs = MockFileSystem::new();
        fs.add_dir(&root);
        Self { root, fs }
    }

    /// Package directory `rel` with one `<last>.go` file importing `imports`.
    pub fn package(self, rel: &str, imports: &[&str]) -> Self {
        let name = rel.rsplit('/').next().unwrap_or(rel);
        let file = format!("{name}.go");
        self.file(rel, &file, &go_source(name, imports))
    }

    /// Arbitrary file `name` with `content` inside directory `rel`.
    pub fn file(self, rel: &str, name: &str, content: &str) -> Self {
        self.fs.add_file(self.root.join(rel).join(name), content);
        self
    }

    /// Empty directory `rel`.
    pub fn dir(self, rel: &str) -> Self {
        self.fs.add_dir(self.root.join(rel));
        self
    }

    pub fn build(self) -> SourceTree {
        SourceTree {
            root: self.root,
            fs: self.fs,
        }
    }
}

/// A built in-memory tree. The filesystem handle stays live, so tests can
/// keep editing it after the scanner has seen it.
#[derive(Clone)]
pub struct SourceTree {
    pub root: PathBuf,
    pub fs: MockFileSystem,
}

impl SourceTree {
    pub fn dir(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub fn fs_handle(&self) -> Arc<dyn FileSystem> {
        Arc::new(self.fs.clone())
    }

    pub fn empty_graph(&self) -> GraphStore {
        GraphStore::new(PackageRoots::new([self.root.clone()]))
    }

    pub fn scanner(&self, registrar: Box<dyn WatchRegistrar>) -> TreeScanner {
        TreeScanner::new(self.fs_handle(), Arc::new(GoImportExtractor), registrar)
    }

    pub fn scanner_with_policy(
        &self,
        registrar: Box<dyn WatchRegistrar>,
        policy: StaleEdgePolicy,
    ) -> TreeScanner {
        self.scanner(registrar).with_stale_edges(policy)
    }

    /// Scan the whole tree into a fresh graph.
    pub fn scanned_graph(&self) -> GraphStore {
        let mut graph = self.empty_graph();
        let mut scanner = self.scanner(Box::new(RecordingRegistrar::default()));
        scanner
            .scan(&mut graph, &self.root)
            .expect("scanning the mock tree should succeed");
        graph
    }

    /// Router over a freshly scanned graph.
    pub fn router(&self, propagation_depth: usize) -> ChangeRouter {
        let mut graph = self.empty_graph();
        let mut scanner = self.scanner(Box::new(RecordingRegistrar::default()));
        scanner
            .scan(&mut graph, &self.root)
            .expect("scanning the mock tree should succeed");
        ChangeRouter::new(
            graph,
            scanner,
            IgnoreSet::editor_defaults(),
            propagation_depth,
        )
    }
}

/// Registrar that remembers every directory it was asked to watch.
///
/// Clones share the list.
#[derive(Debug, Clone, Default)]
pub struct RecordingRegistrar {
    registered: Arc<Mutex<Vec<PathBuf>>>,
    fail_on: Option<PathBuf>,
}

impl RecordingRegistrar {
    /// A registrar that refuses to watch `dir`.
    pub fn failing_on(dir: impl Into<PathBuf>) -> Self {
        Self {
            registered: Arc::default(),
            fail_on: Some(dir.into()),
        }
    }

    pub fn registered(&self) -> Vec<PathBuf> {
        self.registered.lock().unwrap().clone()
    }

    pub fn count(&self, dir: &Path) -> usize {
        self.registered
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.as_path() == dir)
            .count()
    }
}

impl WatchRegistrar for RecordingRegistrar {
    fn register(&mut self, dir: &Path) -> anyhow::Result<()> {
        if self.fail_on.as_deref() == Some(dir) {
            anyhow::bail!("too many open files");
        }
        self.registered.lock().unwrap().push(dir.to_path_buf());
        Ok(())
    }
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.config.roots.push(root.into());
        self
    }

    pub fn with_propagation_depth(mut self, depth: usize) -> Self {
        self.config.config.propagation_depth = depth;
        self
    }

    pub fn with_stale_edges(mut self, policy: StaleEdgePolicy) -> Self {
        self.config.config.stale_edges = policy;
        self
    }

    pub fn with_ignore(mut self, pattern: &str) -> Self {
        self.config.watch.ignore.push(pattern.to_string());
        self
    }

    pub fn with_build_command(mut self, cmd: &str, args: &[&str]) -> Self {
        self.config.build.cmd = cmd.to_string();
        self.config.build.args = args.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
