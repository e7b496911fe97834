// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load `path` if given, otherwise the default config file if it exists,
/// otherwise an all-defaults configuration.
///
/// An explicitly named file that cannot be read is an error.
pub fn load_or_default(path: Option<&Path>) -> Result<RawConfigFile> {
    match path {
        Some(path) => load_from_path(path),
        None => {
            let default_path = default_config_path();
            if default_path.is_file() {
                debug!(path = %default_path.display(), "loading default config file");
                load_from_path(default_path)
            } else {
                Ok(RawConfigFile::default())
            }
        }
    }
}

/// Pick the effective source roots.
///
/// Precedence: roots given on the command line, then `[config].roots`,
/// then each `$GOPATH` entry joined with `src`.
pub fn resolve_roots(raw: &mut RawConfigFile, cli_roots: &[PathBuf], gopath: Option<&str>) {
    if !cli_roots.is_empty() {
        raw.config.roots = cli_roots.to_vec();
    } else if raw.config.roots.is_empty() {
        raw.config.roots = gopath.map(roots_from_gopath).unwrap_or_default();
    }
}

/// `$GOPATH` is a list of workspaces; sources live under `<entry>/src`.
pub fn roots_from_gopath(gopath: &str) -> Vec<PathBuf> {
    std::env::split_paths(gopath)
        .filter(|entry| !entry.as_os_str().is_empty())
        .map(|entry| entry.join("src"))
        .collect()
}

/// Load configuration, resolve roots and run validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML (or falls back to defaults, see [`load_or_default`]).
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Resolves roots (see [`resolve_roots`]).
/// - Checks that there is at least one root, that the propagation depth is
///   positive and that every glob compiles.
pub fn load_and_validate(
    path: Option<&Path>,
    cli_roots: &[PathBuf],
    gopath: Option<&str>,
) -> Result<ConfigFile> {
    let mut raw_config = load_or_default(path)?;
    resolve_roots(&mut raw_config, cli_roots, gopath);
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Helper to resolve a default config path: `Autotest.toml` in the current
/// working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Autotest.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_roots_take_precedence() {
        let mut raw = RawConfigFile::default();
        raw.config.roots = vec![PathBuf::from("/from/config")];

        resolve_roots(&mut raw, &[PathBuf::from("/from/cli")], Some("/gopath"));

        assert_eq!(raw.config.roots, vec![PathBuf::from("/from/cli")]);
    }

    #[test]
    fn config_roots_beat_gopath() {
        let mut raw = RawConfigFile::default();
        raw.config.roots = vec![PathBuf::from("/from/config")];

        resolve_roots(&mut raw, &[], Some("/gopath"));

        assert_eq!(raw.config.roots, vec![PathBuf::from("/from/config")]);
    }

    #[cfg(unix)]
    #[test]
    fn gopath_entries_get_src_suffix() {
        let mut raw = RawConfigFile::default();

        resolve_roots(&mut raw, &[], Some("/a:/b::"));

        assert_eq!(
            raw.config.roots,
            vec![PathBuf::from("/a/src"), PathBuf::from("/b/src")]
        );
    }

    #[test]
    fn no_source_of_roots_leaves_them_empty() {
        let mut raw = RawConfigFile::default();
        resolve_roots(&mut raw, &[], None);
        assert!(raw.config.roots.is_empty());
    }
}
