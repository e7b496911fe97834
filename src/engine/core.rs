// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels
//! - handing packages to the build backend
//! - handling Ctrl+C / shutdown
//!
//! The core is intended to be extensively unit tested without any Tokio,
//! channels, filesystem, or processes.

use crate::engine::event_handlers::{
    handle_build_completion, handle_direct_request, handle_implied_request, CoreStep,
};
use crate::engine::queue::PendingBuilds;
use crate::engine::{RuntimeEvent, RuntimeOptions};

/// Pure core runtime state.
///
/// It is the single owner of both queues and of the building slot, and has
/// **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug, Default)]
pub struct CoreRuntime {
    pending: PendingBuilds,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(options: RuntimeOptions) -> Self {
        Self {
            pending: PendingBuilds::new(),
            options,
        }
    }

    /// Read-only view of the queues and the building slot.
    pub fn pending(&self) -> &PendingBuilds {
        &self.pending
    }

    /// No build running and nothing queued.
    pub fn is_idle(&self) -> bool {
        self.pending.is_idle()
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::DirectRequested { package } => {
                handle_direct_request(&mut self.pending, &self.options, package)
            }
            RuntimeEvent::ImpliedRequested { package } => {
                handle_implied_request(&mut self.pending, &self.options, package)
            }
            RuntimeEvent::BuildCompleted { package, outcome } => {
                handle_build_completion(&mut self.pending, &self.options, package, outcome)
            }
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}
