// src/graph/roots.rs

use std::path::{Path, PathBuf};

use super::PackagePath;

/// The configured source roots.
///
/// A package is named by its directory with the first matching root prefix
/// stripped, so `/home/me/go/src/github.com/acme/lib` and a second checkout
/// under another root both become `github.com/acme/lib`.
#[derive(Debug, Clone, Default)]
pub struct PackageRoots {
    roots: Vec<PathBuf>,
}

impl PackageRoots {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Canonical package path for `dir`.
    ///
    /// Directories outside every root (and the roots themselves) keep their
    /// full path, with forward slashes.
    pub fn package_path(&self, dir: &Path) -> PackagePath {
        for root in &self.roots {
            if let Ok(rel) = dir.strip_prefix(root) {
                if !rel.as_os_str().is_empty() {
                    return slashed(rel);
                }
            }
        }
        slashed(dir)
    }
}

fn slashed(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_first_matching_root() {
        let roots = PackageRoots::new(["/go/src", "/other/src"]);

        assert_eq!(roots.package_path(Path::new("/go/src/acme/lib")), "acme/lib");
        assert_eq!(roots.package_path(Path::new("/other/src/acme/lib")), "acme/lib");
    }

    #[test]
    fn paths_outside_roots_are_kept_whole() {
        let roots = PackageRoots::new(["/go/src"]);

        assert_eq!(roots.package_path(Path::new("/elsewhere/pkg")), "/elsewhere/pkg");
        assert_eq!(roots.package_path(Path::new("/go/src")), "/go/src");
        // Prefix match is per path component, not per character.
        assert_eq!(roots.package_path(Path::new("/go/srcx/pkg")), "/go/srcx/pkg");
    }
}
