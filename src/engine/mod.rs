// src/engine/mod.rs

//! Build scheduling engine.
//!
//! This module ties together:
//! - the two pending-build queues (direct and implied)
//! - the single "currently building" slot
//! - the main runtime event loop that reacts to:
//!   - direct build requests
//!   - implied build requests
//!   - build completion signals
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use crate::graph::PackagePath;
use crate::types::{BuildRequest, RequestKind};

/// Outcome of a build for the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Success,
    /// Non-zero exit, or `-1` when the build could not be launched.
    Failed(i32),
    /// The package has no known directory; nothing was run.
    Unresolved,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// If true, exit the runtime once no build is running and both queues
    /// are empty (used for `--once`).
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from the router, build workers, etc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// A package's own source changed.
    DirectRequested { package: PackagePath },
    /// A package imports a changed package.
    ImpliedRequested { package: PackagePath },
    /// The running build finished (whatever the outcome).
    BuildCompleted {
        package: PackagePath,
        outcome: BuildOutcome,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

impl From<BuildRequest> for RuntimeEvent {
    fn from(request: BuildRequest) -> Self {
        match request.kind {
            RequestKind::Direct => RuntimeEvent::DirectRequested {
                package: request.package,
            },
            RequestKind::Implied => RuntimeEvent::ImpliedRequested {
                package: request.package,
            },
        }
    }
}

pub mod core;
pub mod event_handlers;
pub mod queue;
pub mod runtime;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use queue::{BuildQueue, PendingBuilds};
pub use runtime::Runtime;
