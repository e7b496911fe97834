// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod graph;
pub mod logging;
pub mod source;
pub mod types;
pub mod watch;

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions};
use crate::exec::{BuildContext, RealBuildBackend};
use crate::fs::{FileSystem, RealFileSystem};
use crate::graph::{import_cycles, GraphStore, PackagePath, PackageRoots};
use crate::source::{GoFileMatcher, GoImportExtractor};
use crate::watch::{ChangeRouter, NullRegistrar, TreeScanner, WatchRegistrar};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and root resolution
/// - the initial scan of every root
/// - scheduler core / runtime
/// - build backend
/// - (optional) file watcher and change router
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let gopath = std::env::var("GOPATH").ok();
    let cfg = load_and_validate(args.config.as_deref(), &args.roots, gopath.as_deref())?;

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let roots: Vec<PathBuf> = cfg
        .roots()
        .iter()
        .map(|root| fs.canonicalize(root).unwrap_or_else(|_| root.clone()))
        .collect();
    info!(?roots, "source roots");

    // No watching in --once / --dry-run; the notify receiver is only needed
    // when the router runs.
    let watching = !args.once && !args.dry_run;
    let (registrar, notify_rx) = if watching {
        let (registrar, rx) = crate::watch::create_watcher()?;
        (Box::new(registrar) as Box<dyn WatchRegistrar>, Some(rx))
    } else {
        (Box::new(NullRegistrar) as Box<dyn WatchRegistrar>, None)
    };

    let mut scanner = TreeScanner::new(Arc::clone(&fs), Arc::new(GoImportExtractor), registrar)
        .with_ignore(cfg.ignore().clone())
        .with_skip_dirs(cfg.skip_dirs().clone())
        .with_stale_edges(cfg.stale_edges());

    let mut graph = GraphStore::new(PackageRoots::new(roots.iter().cloned()));
    for root in roots.iter() {
        let summary = scanner.scan(&mut graph, root)?;
        debug!(root = ?root, ?summary, "initial scan complete");
    }

    for cycle in import_cycles(&graph) {
        warn!(?cycle, "import cycle");
    }

    if args.dry_run {
        print_dry_run(&cfg, &graph);
        return Ok(());
    }
    debug!("dependents:\n{}", dependents_report(&graph));

    // Runtime event channel; sized so the startup seeds never block before
    // the runtime starts draining it.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64usize.max(args.packages.len() + 1));

    let ctx = BuildContext {
        locations: graph.locations(),
        fs: Arc::clone(&fs),
        matcher: Arc::new(GoFileMatcher::host()),
        ignore: cfg.ignore().clone(),
        command: cfg.build_command(),
    };
    let backend = RealBuildBackend::new(rt_tx.clone(), ctx);

    let seeds: Vec<PackagePath> = args
        .packages
        .iter()
        .map(|target| seed_package(fs.as_ref(), &graph, target))
        .collect();

    let _router_handle = match notify_rx {
        Some(notify_rx) => {
            let router = ChangeRouter::new(
                graph,
                scanner,
                cfg.ignore().clone(),
                cfg.propagation_depth(),
            );
            Some(crate::watch::spawn_router(router, notify_rx, rt_tx.clone()))
        }
        None => None,
    };

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    if args.once && seeds.is_empty() {
        info!("--once without --package; nothing to build");
        return Ok(());
    }

    if !seeds.is_empty() {
        info!(packages = ?seeds, "initial build requests");
    }
    for package in seeds {
        rt_tx.send(RuntimeEvent::DirectRequested { package }).await?;
    }

    let options = RuntimeOptions {
        exit_when_idle: args.once,
    };

    // Construct the pure core runtime (single source of truth for semantics).
    let core = CoreRuntime::new(options);

    // Construct the async IO shell around the core.
    let runtime = Runtime::new(core, rt_rx, backend);
    runtime.run().await?;
    Ok(())
}

/// A `--package` value is either a directory (mapped to its package path)
/// or already a package path.
fn seed_package(fs: &dyn FileSystem, graph: &GraphStore, target: &str) -> PackagePath {
    let as_dir = Path::new(target);
    if fs.is_dir(as_dir) {
        let dir = fs
            .canonicalize(as_dir)
            .unwrap_or_else(|_| as_dir.to_path_buf());
        graph.package_path(&dir)
    } else {
        target.to_string()
    }
}

/// Dependents map, one `<package> -> [a, b]` line per imported package,
/// sorted by key with sorted values.
pub fn dependents_report(graph: &GraphStore) -> String {
    let mut out = String::new();
    for (package, dependents) in graph.dependents_map() {
        let _ = writeln!(out, "{package} -> [{}]", dependents.join(", "));
    }
    out
}

/// Dry-run output: resolved settings, the dependents map and any cycles.
fn print_dry_run(cfg: &ConfigFile, graph: &GraphStore) {
    println!("autotest dry-run");
    println!("  config.roots = {:?}", graph.roots().roots());
    println!("  config.propagation_depth = {}", cfg.propagation_depth());
    println!("  config.stale_edges = {:?}", cfg.stale_edges());
    let cmd = cfg.build_command();
    println!("  build = {} {}", cmd.program, cmd.args.join(" "));
    let watch = cfg.watch_section();
    println!("  watch.ignore = {:?}", watch.ignore);
    println!("  watch.skip_dirs = {:?}", watch.skip_dirs);
    println!();

    println!("dependents:");
    print!("{}", dependents_report(graph));

    let cycles = import_cycles(graph);
    if !cycles.is_empty() {
        println!();
        println!("import cycles ({}):", cycles.len());
        for cycle in cycles {
            println!("  - {}", cycle.join(" -> "));
        }
    }

    debug!("dry-run complete (no builds)");
}
