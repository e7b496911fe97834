// src/exec/worker.rs

//! Runs one build.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::engine::{BuildOutcome, RuntimeEvent};
use crate::fs::FileSystem;
use crate::graph::{LocationIndex, PackagePath};
use crate::source::FileMatcher;
use crate::watch::patterns::IgnoreSet;

/// Program and leading arguments of the test command. The package's
/// eligible file names are appended after `args`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for BuildCommand {
    fn default() -> Self {
        Self {
            program: "go".to_string(),
            args: vec!["test".to_string(), "-v".to_string()],
        }
    }
}

/// Everything a build needs besides the package name.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub locations: LocationIndex,
    pub fs: Arc<dyn FileSystem>,
    pub matcher: Arc<dyn FileMatcher>,
    pub ignore: IgnoreSet,
    pub command: BuildCommand,
}

/// Build `package` and post `BuildCompleted` to the runtime.
///
/// The completion is sent whatever happens: unknown package, unreadable
/// directory, launch failure or a failing test run.
pub async fn run_build(
    package: PackagePath,
    ctx: Arc<BuildContext>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    let outcome = match ctx.locations.get(&package) {
        None => {
            debug!(package = %package, "target not known; nothing to build");
            BuildOutcome::Unresolved
        }
        Some(dir) => {
            info!(package = %package, "building");
            match build_in_dir(&package, &dir, &ctx).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    error!(package = %package, error = %err, "build execution error");
                    BuildOutcome::Failed(-1)
                }
            }
        }
    };

    match outcome {
        BuildOutcome::Success => info!(package = %package, "built {package}: success"),
        BuildOutcome::Failed(code) => {
            warn!(package = %package, exit_code = code, "built {package}: failed (exit code {code})")
        }
        BuildOutcome::Unresolved => {}
    }

    if let Err(err) = runtime_tx
        .send(RuntimeEvent::BuildCompleted { package, outcome })
        .await
    {
        warn!("failed to send BuildCompleted to runtime: {err}");
    }
}

/// File names in `dir` that belong in a build of that directory, sorted.
pub fn eligible_files(ctx: &BuildContext, dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();

    for path in ctx.fs.read_dir(dir)? {
        if !ctx.fs.is_file(&path) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if ctx.ignore.is_ignored(name) {
            continue;
        }
        if ctx.matcher.matches(ctx.fs.as_ref(), dir, name) {
            files.push(name.to_string());
        } else {
            debug!(file = %name, "ignoring file");
        }
    }

    files.sort();
    Ok(files)
}

async fn build_in_dir(package: &str, dir: &Path, ctx: &BuildContext) -> Result<BuildOutcome> {
    let files = eligible_files(ctx, dir).with_context(|| format!("unable to list {:?}", dir))?;

    let mut cmd = Command::new(&ctx.command.program);
    cmd.args(&ctx.command.args)
        .args(&files)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    debug!(
        package,
        program = %ctx.command.program,
        args = ?ctx.command.args,
        ?files,
        "starting build process"
    );

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning '{}' for {}", ctx.command.program, package))?;

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for build of {}", package))?;

    Ok(if status.success() {
        BuildOutcome::Success
    } else {
        BuildOutcome::Failed(status.code().unwrap_or(-1))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use crate::source::GoFileMatcher;

    fn ctx(fs: &MockFileSystem) -> BuildContext {
        BuildContext {
            locations: LocationIndex::new(),
            fs: Arc::new(fs.clone()),
            matcher: Arc::new(GoFileMatcher::new("linux", "amd64")),
            ignore: IgnoreSet::editor_defaults(),
            command: BuildCommand::default(),
        }
    }

    #[test]
    fn eligible_files_excludes_temporaries_and_other_platforms() {
        let fs = MockFileSystem::new();
        fs.add_file("/src/lib/lib.go", "package lib\n");
        fs.add_file("/src/lib/lib_test.go", "package lib\n");
        fs.add_file("/src/lib/lib_windows.go", "package lib\n");
        fs.add_file("/src/lib/flycheck_lib.go", "package lib\n");
        fs.add_file("/src/lib/.#lib.go", "package lib\n");
        fs.add_file("/src/lib/notes.txt", "hi");
        fs.add_file("/src/lib/sub/inner.go", "package sub\n");

        let files = eligible_files(&ctx(&fs), Path::new("/src/lib")).unwrap();
        assert_eq!(files, vec!["lib.go", "lib_test.go"]);
    }

    #[tokio::test]
    async fn unknown_package_completes_as_unresolved() {
        let fs = MockFileSystem::new();
        let (tx, mut rx) = mpsc::channel(4);

        run_build("ghost".to_string(), Arc::new(ctx(&fs)), tx).await;

        assert_eq!(
            rx.recv().await,
            Some(RuntimeEvent::BuildCompleted {
                package: "ghost".to_string(),
                outcome: BuildOutcome::Unresolved,
            })
        );
    }

    #[tokio::test]
    async fn unreadable_directory_completes_as_failed() {
        let fs = MockFileSystem::new();
        let ctx = ctx(&fs);
        ctx.locations.insert("gone", Path::new("/src/gone"));
        let (tx, mut rx) = mpsc::channel(4);

        run_build("gone".to_string(), Arc::new(ctx), tx).await;

        assert_eq!(
            rx.recv().await,
            Some(RuntimeEvent::BuildCompleted {
                package: "gone".to_string(),
                outcome: BuildOutcome::Failed(-1),
            })
        );
    }
}
