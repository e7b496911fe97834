// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::BuildBackend;

use super::core::CoreRuntime;
use super::{CoreCommand, RuntimeEvent};

/// Drives the scheduler core in response to `RuntimeEvent`s, and delegates
/// actual builds to a `BuildBackend`.
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// scheduling semantics. Every event, whoever sent it, arrives through the
/// one `event_rx`, so queue state only ever changes on this task.
pub struct Runtime<B: BuildBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    backend: B,
}

impl<B: BuildBackend> fmt::Debug for Runtime<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<B: BuildBackend> Runtime<B> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, backend: B) -> Self {
        Self {
            core,
            event_rx,
            backend,
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `RuntimeEvent`s from `event_rx`.
    /// - Feeds them into the core runtime.
    /// - Executes commands returned by the core (start build, exit).
    pub async fn run(mut self) -> Result<()> {
        info!("autotest runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::StartBuild(package) => {
                debug!(package = %package, "dispatching build");
                self.backend.start_build(package).await?;
            }
            CoreCommand::RequestExit => {
                // keep_running=false already ends the loop; just log it.
                info!("scheduler idle; exit requested");
            }
        }
        Ok(())
    }
}
