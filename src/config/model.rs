// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::exec::BuildCommand;
use crate::types::StaleEdgePolicy;
use crate::watch::patterns::{IgnoreSet, DEFAULT_IGNORE, DEFAULT_SKIP_DIRS};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// roots = ["/home/me/go/src"]
/// propagation_depth = 1
/// stale_edges = "keep"
///
/// [watch]
/// ignore = ["flycheck_*", ".#*"]
/// skip_dirs = [".git"]
///
/// [build]
/// cmd = "go"
/// args = ["test", "-v"]
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub build: BuildSection,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSection {
    /// Source roots to scan and watch.
    ///
    /// If empty, the loader fills it from `$GOPATH`.
    #[serde(default)]
    pub roots: Vec<PathBuf>,

    /// How many hops of dependents a change rebuilds. `1` means only the
    /// packages that import the changed package directly.
    #[serde(default = "default_propagation_depth")]
    pub propagation_depth: usize,

    /// What a re-scan does with imports that disappeared from the source.
    #[serde(default)]
    pub stale_edges: StaleEdgePolicy,
}

fn default_propagation_depth() -> usize {
    1
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            propagation_depth: default_propagation_depth(),
            stale_edges: StaleEdgePolicy::default(),
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    /// File-name globs whose changes never trigger a build and which are
    /// never parsed or passed to the build command.
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,

    /// Directory-name globs the scanner does not descend into.
    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,
}

fn default_ignore() -> Vec<String> {
    DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect()
}

fn default_skip_dirs() -> Vec<String> {
    DEFAULT_SKIP_DIRS.iter().map(|s| s.to_string()).collect()
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            ignore: default_ignore(),
            skip_dirs: default_skip_dirs(),
        }
    }
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    #[serde(default = "default_cmd")]
    pub cmd: String,

    #[serde(default = "default_args")]
    pub args: Vec<String>,
}

fn default_cmd() -> String {
    "go".to_string()
}

fn default_args() -> Vec<String> {
    vec!["test".to_string(), "-v".to_string()]
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            cmd: default_cmd(),
            args: default_args(),
        }
    }
}

impl From<&BuildSection> for BuildCommand {
    fn from(section: &BuildSection) -> Self {
        BuildCommand {
            program: section.cmd.clone(),
            args: section.args.clone(),
        }
    }
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>`, so holding one means
/// there is at least one root and every glob compiled.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    config: ConfigSection,
    watch: WatchSection,
    build: BuildSection,
    ignore: IgnoreSet,
    skip_dirs: IgnoreSet,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        watch: WatchSection,
        build: BuildSection,
        ignore: IgnoreSet,
        skip_dirs: IgnoreSet,
    ) -> Self {
        Self {
            config,
            watch,
            build,
            ignore,
            skip_dirs,
        }
    }

    pub fn watch_section(&self) -> &WatchSection {
        &self.watch
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.config.roots
    }

    pub fn propagation_depth(&self) -> usize {
        self.config.propagation_depth
    }

    pub fn stale_edges(&self) -> StaleEdgePolicy {
        self.config.stale_edges
    }

    /// Compiled `[watch].ignore`.
    pub fn ignore(&self) -> &IgnoreSet {
        &self.ignore
    }

    /// Compiled `[watch].skip_dirs`.
    pub fn skip_dirs(&self) -> &IgnoreSet {
        &self.skip_dirs
    }

    pub fn build_command(&self) -> BuildCommand {
        BuildCommand::from(&self.build)
    }
}
