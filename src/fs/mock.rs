// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const MAX_SYMLINK_HOPS: usize = 40;

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir(Vec<String>), // List of child names
    Symlink(PathBuf),
}

/// In-memory filesystem. Clones share the same tree, so a test can keep a
/// handle and mutate the tree after handing a clone to the code under test.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut files = HashMap::new();
        // Ensure root exists
        files.insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            files: Arc::new(Mutex::new(files)),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut files = self.files.lock().unwrap();
        files.insert(path.clone(), MockEntry::File(content.into()));
        Self::link_into_parent(&mut files, &path);
    }

    /// Create an (empty) directory and any missing ancestors.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut files = self.files.lock().unwrap();
        Self::ensure_dir_entry(&mut files, path.as_ref());
    }

    /// Create a symbolic link at `link` pointing to `target`.
    ///
    /// Like a real link, the target need not exist.
    pub fn add_symlink(&self, link: impl AsRef<Path>, target: impl AsRef<Path>) {
        let link = link.as_ref().to_path_buf();
        let mut files = self.files.lock().unwrap();
        files.insert(link.clone(), MockEntry::Symlink(target.as_ref().to_path_buf()));
        Self::link_into_parent(&mut files, &link);
    }

    /// Remove a file or a whole directory subtree.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut files = self.files.lock().unwrap();
        files.retain(|p, _| !p.starts_with(path));

        if let Some(parent) = path.parent() {
            let parent = Self::normalize_parent(parent);
            if let (Some(MockEntry::Dir(children)), Some(name)) =
                (files.get_mut(parent), path.file_name().and_then(|n| n.to_str()))
            {
                children.retain(|c| c != name);
            }
        }
    }

    /// Follow symlinks in the final component, giving up after as many hops
    /// as the kernel allows before `ELOOP`.
    fn resolve<'a>(
        files: &'a HashMap<PathBuf, MockEntry>,
        path: &Path,
    ) -> Option<(PathBuf, &'a MockEntry)> {
        let mut current = path.to_path_buf();
        for _ in 0..MAX_SYMLINK_HOPS {
            match files.get(&current)? {
                MockEntry::Symlink(target) => {
                    current = match current.parent() {
                        Some(parent) if target.is_relative() => parent.join(target),
                        _ => target.clone(),
                    };
                }
                entry => return Some((current, entry)),
            }
        }
        None
    }

    fn normalize_parent(parent: &Path) -> &Path {
        if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        }
    }

    fn link_into_parent(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let Some(parent) = path.parent() else {
            return;
        };
        let parent = Self::normalize_parent(parent);
        if parent == path {
            return;
        }

        Self::ensure_dir_entry(files, parent);
        if let Some(MockEntry::Dir(children)) = files.get_mut(parent) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if !children.contains(&name.to_string()) {
                    children.push(name.to_string());
                }
            }
        }
    }

    fn ensure_dir_entry(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if !files.contains_key(path) {
            files.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
            Self::link_into_parent(files, path);
        }
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let files = self.files.lock().unwrap();
        match Self::resolve(&files, path) {
            Some((_, MockEntry::File(content))) => {
                String::from_utf8(content.clone()).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
            }
            Some(_) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        Self::resolve(&files, path).is_some()
    }

    fn is_file(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        matches!(Self::resolve(&files, path), Some((_, MockEntry::File(_))))
    }

    fn is_dir(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        matches!(Self::resolve(&files, path), Some((_, MockEntry::Dir(_))))
    }

    fn is_symlink(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        matches!(files.get(path), Some(MockEntry::Symlink(_)))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        let files = self.files.lock().unwrap();
        match Self::resolve(&files, path) {
            Some((real, _)) => Ok(real),
            // Absolute paths are assumed in tests; unknown ones pass through.
            None => Ok(path.to_path_buf()),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let files = self.files.lock().unwrap();
        match Self::resolve(&files, path) {
            Some((_, MockEntry::Dir(children))) => {
                let mut entries: Vec<PathBuf> =
                    children.iter().map(|name| path.join(name)).collect();
                entries.sort();
                Ok(entries)
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_file_creates_parent_directories() {
        let fs = MockFileSystem::new();
        fs.add_file("/src/lib/lib.go", "package lib");

        assert!(fs.is_dir(Path::new("/src")));
        assert!(fs.is_dir(Path::new("/src/lib")));
        assert!(fs.is_file(Path::new("/src/lib/lib.go")));
        assert_eq!(
            fs.read_dir(Path::new("/src")).unwrap(),
            vec![PathBuf::from("/src/lib")]
        );
    }

    #[test]
    fn symlinks_are_followed_but_reported() {
        let fs = MockFileSystem::new();
        fs.add_file("/src/lib/lib.go", "package lib");
        fs.add_symlink("/src/lib/loop", "/src");
        fs.add_symlink("/src/alias.go", "lib/lib.go");
        fs.add_symlink("/src/self", "/src/self");

        assert!(fs.is_symlink(Path::new("/src/lib/loop")));
        assert!(fs.is_dir(Path::new("/src/lib/loop")));
        assert!(!fs.is_symlink(Path::new("/src/lib")));
        assert!(fs.is_file(Path::new("/src/alias.go")));
        assert_eq!(
            fs.read_to_string(Path::new("/src/alias.go")).unwrap(),
            "package lib"
        );
        assert_eq!(
            fs.read_dir(Path::new("/src/lib/loop")).unwrap(),
            vec![
                PathBuf::from("/src/lib/loop/alias.go"),
                PathBuf::from("/src/lib/loop/lib"),
                PathBuf::from("/src/lib/loop/self"),
            ]
        );

        // A link to itself resolves to nothing.
        assert!(fs.is_symlink(Path::new("/src/self")));
        assert!(!fs.exists(Path::new("/src/self")));
        assert!(!fs.is_dir(Path::new("/src/self")));
    }

    #[test]
    fn remove_drops_subtree_and_parent_link() {
        let fs = MockFileSystem::new();
        fs.add_file("/src/lib/lib.go", "package lib");
        fs.add_file("/src/app/app.go", "package main");

        fs.remove("/src/lib");

        assert!(!fs.exists(Path::new("/src/lib/lib.go")));
        assert!(fs.read_dir(Path::new("/src/lib")).is_err());
        assert_eq!(
            fs.read_dir(Path::new("/src")).unwrap(),
            vec![PathBuf::from("/src/app")]
        );
    }
}
