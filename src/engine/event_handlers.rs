// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use tracing::{debug, warn};

use crate::engine::queue::PendingBuilds;
use crate::engine::{BuildOutcome, RuntimeOptions};
use crate::graph::PackagePath;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Start building this package.
    StartBuild(PackagePath),
    /// Request that the process exits (used for `--once` when idle).
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

pub fn handle_direct_request(
    pending: &mut PendingBuilds,
    options: &RuntimeOptions,
    package: PackagePath,
) -> CoreStep {
    pending.request_direct(&package);
    after_event(pending, options)
}

pub fn handle_implied_request(
    pending: &mut PendingBuilds,
    options: &RuntimeOptions,
    package: PackagePath,
) -> CoreStep {
    pending.request_implied(&package);
    after_event(pending, options)
}

/// Handle a build completion event.
///
/// The outcome has already been reported by the worker; a failure does not
/// change what runs next.
pub fn handle_build_completion(
    pending: &mut PendingBuilds,
    options: &RuntimeOptions,
    package: PackagePath,
    outcome: BuildOutcome,
) -> CoreStep {
    if pending.complete(&package) {
        debug!(package = %package, ?outcome, "build slot released");
    } else {
        warn!(
            package = %package,
            building = ?pending.building(),
            "completion for a build that is not running; ignoring"
        );
    }
    after_event(pending, options)
}

/// Start the next build if the slot is free, and decide whether to keep
/// running.
fn after_event(pending: &mut PendingBuilds, options: &RuntimeOptions) -> CoreStep {
    let mut commands = Vec::new();

    if let Some(next) = pending.start_next() {
        commands.push(CoreCommand::StartBuild(next));
    }

    // In `--once` mode, we can exit when nothing is running and nothing is
    // queued.
    let mut keep_running = true;
    if options.exit_when_idle && pending.is_idle() {
        keep_running = false;
        commands.push(CoreCommand::RequestExit);
    }

    CoreStep {
        commands,
        keep_running,
    }
}
