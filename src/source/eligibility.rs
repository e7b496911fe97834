// src/source/eligibility.rs

use std::collections::HashSet;
use std::fmt::Debug;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::fs::FileSystem;

/// Decides whether a file belongs in a build of its directory.
pub trait FileMatcher: Send + Sync + Debug {
    fn matches(&self, fs: &dyn FileSystem, dir: &Path, file_name: &str) -> bool;
}

const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js",
    "linux", "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips",
    "mipsle", "mips64", "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le",
    "riscv", "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
];

const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];

static GO_BUILD_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^//go:build\s+(.+?)\s*$").expect("valid regex"));

static PLUS_BUILD_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^//\s*\+build\s+(.+?)\s*$").expect("valid regex"));

/// File matcher following the `go` tool's rules for a target platform.
#[derive(Debug, Clone)]
pub struct GoFileMatcher {
    tags: HashSet<String>,
}

impl GoFileMatcher {
    /// Matcher for an explicit `GOOS` / `GOARCH` pair.
    pub fn new(goos: &str, goarch: &str) -> Self {
        let mut tags: HashSet<String> = [goos, goarch, "gc", "cgo"]
            .into_iter()
            .map(str::to_string)
            .collect();

        // GOOS values that imply another one.
        match goos {
            "android" => {
                tags.insert("linux".into());
            }
            "illumos" => {
                tags.insert("solaris".into());
            }
            "ios" => {
                tags.insert("darwin".into());
            }
            _ => {}
        }
        if UNIX_OS.contains(&goos) {
            tags.insert("unix".into());
        }

        Self { tags }
    }

    /// Matcher for the platform this binary runs on.
    pub fn host() -> Self {
        let goos = match std::env::consts::OS {
            "macos" => "darwin",
            other => other,
        };
        let goarch = match std::env::consts::ARCH {
            "x86" => "386",
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "powerpc64" if cfg!(target_endian = "little") => "ppc64le",
            "powerpc64" => "ppc64",
            "wasm32" => "wasm",
            "loongarch64" => "loong64",
            other => other,
        };
        Self::new(goos, goarch)
    }

    fn match_tag(&self, tag: &str) -> bool {
        if self.tags.contains(tag) {
            return true;
        }
        // Release tags: every go1.N is considered satisfied.
        tag.strip_prefix("go1.")
            .is_some_and(|minor| !minor.is_empty() && minor.bytes().all(|b| b.is_ascii_digit()))
    }

    /// `name_GOOS_GOARCH.go`, `name_GOOS.go` and `name_GOARCH.go` rules.
    fn matches_file_name(&self, file_name: &str) -> bool {
        let stem = match file_name.find('.') {
            Some(dot) => &file_name[..dot],
            None => file_name,
        };
        let Some(underscore) = stem.find('_') else {
            return true;
        };

        let mut parts: Vec<&str> = stem[underscore..].split('_').collect();
        if parts.last() == Some(&"test") {
            parts.pop();
        }

        let n = parts.len();
        if n >= 2 && KNOWN_OS.contains(&parts[n - 2]) && KNOWN_ARCH.contains(&parts[n - 1]) {
            return self.match_tag(parts[n - 2]) && self.match_tag(parts[n - 1]);
        }
        if n >= 1 && (KNOWN_OS.contains(&parts[n - 1]) || KNOWN_ARCH.contains(&parts[n - 1])) {
            return self.match_tag(parts[n - 1]);
        }
        true
    }

    /// Evaluate the build constraints in the file header.
    ///
    /// `//go:build` wins over legacy `// +build` lines. Returns `None` for a
    /// malformed constraint.
    fn matches_constraints(&self, src: &str) -> Option<bool> {
        let mut plus_lines = Vec::new();

        for line in src.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if !line.starts_with("//") {
                break;
            }
            if let Some(caps) = GO_BUILD_LINE.captures(line) {
                return eval_expr(&caps[1], &|tag| self.match_tag(tag));
            }
            if let Some(caps) = PLUS_BUILD_LINE.captures(line) {
                plus_lines.push(caps[1].to_string());
            }
        }

        // Lines are ANDed; space-separated terms ORed; comma-separated ANDed.
        Some(plus_lines.iter().all(|line| {
            line.split_whitespace().any(|term| {
                term.split(',').all(|atom| match atom.strip_prefix('!') {
                    Some(tag) => !self.match_tag(tag),
                    None => self.match_tag(atom),
                })
            })
        }))
    }
}

impl Default for GoFileMatcher {
    fn default() -> Self {
        Self::host()
    }
}

impl FileMatcher for GoFileMatcher {
    fn matches(&self, fs: &dyn FileSystem, dir: &Path, file_name: &str) -> bool {
        if !file_name.ends_with(".go") || file_name.starts_with('.') || file_name.starts_with('_')
        {
            return false;
        }
        if !self.matches_file_name(file_name) {
            return false;
        }

        let path = dir.join(file_name);
        let src = match fs.read_to_string(&path) {
            Ok(s) => s,
            Err(err) => {
                debug!(file = ?path, error = %err, "unable to read file for build constraints");
                return false;
            }
        };

        self.matches_constraints(&src).unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ExprToken<'a> {
    Not,
    And,
    Or,
    LParen,
    RParen,
    Tag(&'a str),
}

fn tokenize(expr: &str) -> Option<Vec<ExprToken<'_>>> {
    let bytes = expr.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'\t' => i += 1,
            b'!' => {
                tokens.push(ExprToken::Not);
                i += 1;
            }
            b'(' => {
                tokens.push(ExprToken::LParen);
                i += 1;
            }
            b')' => {
                tokens.push(ExprToken::RParen);
                i += 1;
            }
            b'&' if bytes.get(i + 1) == Some(&b'&') => {
                tokens.push(ExprToken::And);
                i += 2;
            }
            b'|' if bytes.get(i + 1) == Some(&b'|') => {
                tokens.push(ExprToken::Or);
                i += 2;
            }
            b if b.is_ascii_alphanumeric() || b == b'_' || b == b'.' => {
                let start = i;
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'.')
                {
                    i += 1;
                }
                tokens.push(ExprToken::Tag(&expr[start..i]));
            }
            _ => return None,
        }
    }

    Some(tokens)
}

/// Evaluate a `//go:build` expression.
fn eval_expr(expr: &str, has_tag: &dyn Fn(&str) -> bool) -> Option<bool> {
    let tokens = tokenize(expr)?;
    let mut pos = 0;
    let value = eval_or(&tokens, &mut pos, has_tag)?;
    (pos == tokens.len()).then_some(value)
}

fn eval_or(tokens: &[ExprToken<'_>], pos: &mut usize, has_tag: &dyn Fn(&str) -> bool) -> Option<bool> {
    let mut value = eval_and(tokens, pos, has_tag)?;
    while tokens.get(*pos) == Some(&ExprToken::Or) {
        *pos += 1;
        let rhs = eval_and(tokens, pos, has_tag)?;
        value = value || rhs;
    }
    Some(value)
}

fn eval_and(tokens: &[ExprToken<'_>], pos: &mut usize, has_tag: &dyn Fn(&str) -> bool) -> Option<bool> {
    let mut value = eval_not(tokens, pos, has_tag)?;
    while tokens.get(*pos) == Some(&ExprToken::And) {
        *pos += 1;
        let rhs = eval_not(tokens, pos, has_tag)?;
        value = value && rhs;
    }
    Some(value)
}

fn eval_not(tokens: &[ExprToken<'_>], pos: &mut usize, has_tag: &dyn Fn(&str) -> bool) -> Option<bool> {
    match tokens.get(*pos)? {
        ExprToken::Not => {
            *pos += 1;
            eval_not(tokens, pos, has_tag).map(|v| !v)
        }
        ExprToken::LParen => {
            *pos += 1;
            let value = eval_or(tokens, pos, has_tag)?;
            if tokens.get(*pos) != Some(&ExprToken::RParen) {
                return None;
            }
            *pos += 1;
            Some(value)
        }
        ExprToken::Tag(tag) => {
            *pos += 1;
            Some(has_tag(tag))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn linux_amd64() -> GoFileMatcher {
        GoFileMatcher::new("linux", "amd64")
    }

    #[test]
    fn file_name_suffixes() {
        let m = linux_amd64();

        assert!(m.matches_file_name("lib.go"));
        assert!(m.matches_file_name("lib_test.go"));
        assert!(m.matches_file_name("lib_linux.go"));
        assert!(m.matches_file_name("lib_amd64.go"));
        assert!(m.matches_file_name("lib_linux_amd64_test.go"));
        assert!(m.matches_file_name("linux.go"));
        assert!(m.matches_file_name("my_helpers.go"));

        assert!(!m.matches_file_name("lib_windows.go"));
        assert!(!m.matches_file_name("lib_arm64.go"));
        assert!(!m.matches_file_name("lib_linux_arm64.go"));
        assert!(!m.matches_file_name("lib_darwin_test.go"));
    }

    #[test]
    fn go_build_expressions() {
        let m = linux_amd64();
        let eval = |src: &str| m.matches_constraints(src);

        assert_eq!(eval("//go:build linux\n\npackage p"), Some(true));
        assert_eq!(eval("//go:build !linux\npackage p"), Some(false));
        assert_eq!(eval("//go:build (darwin || linux) && amd64\npackage p"), Some(true));
        assert_eq!(eval("//go:build unix && !cgo\npackage p"), Some(false));
        assert_eq!(eval("//go:build ignore\npackage p"), Some(false));
        assert_eq!(eval("//go:build go1.21\npackage p"), Some(true));
        assert_eq!(eval("//go:build linux &&\npackage p"), None);
        assert_eq!(eval("// Copyright\n\npackage p\n//go:build ignore\n"), Some(true));
    }

    #[test]
    fn legacy_plus_build_lines() {
        let m = linux_amd64();

        assert_eq!(m.matches_constraints("// +build linux darwin\n\npackage p"), Some(true));
        assert_eq!(m.matches_constraints("// +build windows,amd64\n\npackage p"), Some(false));
        assert_eq!(
            m.matches_constraints("// +build linux\n// +build !amd64\n\npackage p"),
            Some(false)
        );
    }

    #[test]
    fn matches_reads_header_through_filesystem() {
        let fs = MockFileSystem::new();
        fs.add_file("/src/lib/lib.go", "package lib\n");
        fs.add_file("/src/lib/gen.go", "//go:build ignore\n\npackage main\n");
        fs.add_file("/src/lib/_skip.go", "package lib\n");
        fs.add_file("/src/lib/README.md", "docs");

        let m = linux_amd64();
        let dir = Path::new("/src/lib");

        assert!(m.matches(&fs, dir, "lib.go"));
        assert!(!m.matches(&fs, dir, "gen.go"));
        assert!(!m.matches(&fs, dir, "_skip.go"));
        assert!(!m.matches(&fs, dir, "README.md"));
        assert!(!m.matches(&fs, dir, "vanished.go"));
    }

    #[test]
    fn implied_os_tags() {
        let m = GoFileMatcher::new("android", "arm64");
        assert!(m.matches_file_name("x_linux.go"));
        assert!(m.match_tag("unix"));

        let w = GoFileMatcher::new("windows", "amd64");
        assert!(!w.match_tag("unix"));
    }
}
