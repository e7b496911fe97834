// src/watch/watcher.rs

use std::path::Path;

use anyhow::{Context, Result};
use notify::event::EventKind;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::RuntimeEvent;
use crate::watch::router::ChangeRouter;

/// Something that can be asked to report future changes inside a directory.
///
/// Registration is per directory (not recursive); the scanner registers
/// every directory it visits. Registering the same directory again must be
/// harmless.
pub trait WatchRegistrar: Send {
    fn register(&mut self, dir: &Path) -> Result<()>;
}

/// Registrar that watches nothing (`--once`, `--dry-run`).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRegistrar;

impl WatchRegistrar for NullRegistrar {
    fn register(&mut self, _dir: &Path) -> Result<()> {
        Ok(())
    }
}

/// Registrar backed by the platform's native `notify` watcher.
///
/// Dropping it stops file watching.
pub struct NotifyRegistrar {
    inner: RecommendedWatcher,
}

impl std::fmt::Debug for NotifyRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyRegistrar").finish()
    }
}

impl WatchRegistrar for NotifyRegistrar {
    fn register(&mut self, dir: &Path) -> Result<()> {
        self.inner
            .watch(dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("watching {:?}", dir))
    }
}

/// Create the native watcher.
///
/// Returns the registrar to hand to the scanner and the stream of raw
/// notifications it will produce.
pub fn create_watcher() -> Result<(
    NotifyRegistrar,
    mpsc::UnboundedReceiver<notify::Result<Event>>,
)> {
    // Channel from the blocking notify callback into the async world.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();

    let watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Err(err) = event_tx.send(res) {
                // We can't log via tracing here easily, so fallback to stderr.
                eprintln!("autotest: failed to forward notify event: {err}");
            }
        },
        Config::default(),
    )
    .context("creating file watcher")?;

    Ok((NotifyRegistrar { inner: watcher }, event_rx))
}

/// Whether a notification means something on disk may have changed.
///
/// Plain access (open / read / close-without-write) does not; everything
/// else is treated alike.
pub fn is_change(kind: &EventKind) -> bool {
    !matches!(kind, EventKind::Access(_))
}

/// Spawn the change-routing loop.
///
/// Notifications are handled strictly one at a time: each one re-scans its
/// directory and forwards the resulting build requests to the runtime
/// before the next notification is looked at. The router owns the graph,
/// so nothing else ever writes to it.
pub fn spawn_router(
    mut router: ChangeRouter,
    mut event_rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("change router started");

        while let Some(res) = event_rx.recv().await {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    warn!(error = %err, "file watch error");
                    continue;
                }
            };

            if !is_change(&event.kind) {
                continue;
            }
            debug!(?event, "received notify event");

            for path in event.paths {
                for request in router.route(&path) {
                    if let Err(err) = runtime_tx.send(RuntimeEvent::from(request)).await {
                        warn!("failed to send build request to runtime: {err}");
                        // If the runtime channel is closed, there's no point
                        // keeping the router loop alive.
                        return;
                    }
                }
            }
        }

        debug!("change router loop finished");
    })
}
