// src/watch/patterns.rs

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Editor autosave / lock / backup names. Changes to these must never
/// trigger a build, or saving in the editor would feed back into itself.
pub const DEFAULT_IGNORE: &[&str] = &["flycheck_*", ".#*", "#*#", "*~", "*.swp"];

/// Directory names the scanner never descends into.
pub const DEFAULT_SKIP_DIRS: &[&str] = &[".git", ".hg", ".svn"];

/// Compiled set of file-name globs.
///
/// Patterns are matched against the final path component only, so
/// `flycheck_*` matches `/src/lib/flycheck_lib.go`.
#[derive(Clone)]
pub struct IgnoreSet {
    patterns: Vec<String>,
    set: GlobSet,
}

impl fmt::Debug for IgnoreSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgnoreSet")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl IgnoreSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pat in patterns {
            let pat = pat.as_ref();
            let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
            builder.add(glob);
        }

        Ok(Self {
            patterns: patterns.iter().map(|p| p.as_ref().to_string()).collect(),
            set: builder.build()?,
        })
    }

    /// A set that matches nothing.
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }

    /// [`DEFAULT_IGNORE`], compiled.
    pub fn editor_defaults() -> Self {
        Self::new(DEFAULT_IGNORE).unwrap_or_else(|_| Self::empty())
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_ignored(&self, file_name: &str) -> bool {
        self.set.is_match(file_name)
    }

    /// Match on the final component of `path`.
    pub fn is_ignored_path(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| self.is_ignored(&name.to_string_lossy()))
    }
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self::editor_defaults()
    }
}
