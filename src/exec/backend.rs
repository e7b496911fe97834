// src/exec/backend.rs

//! Pluggable build backend abstraction.
//!
//! The runtime talks to a `BuildBackend` instead of spawning processes
//! itself. This makes it easy to swap in a fake backend in tests while
//! keeping the production worker in [`super::worker`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::engine::RuntimeEvent;
use crate::errors::Result;
use crate::graph::PackagePath;

use super::worker::{run_build, BuildContext};

/// Trait abstracting how a build is started.
///
/// Implementations must eventually post exactly one
/// `RuntimeEvent::BuildCompleted` for every package they are handed, and
/// must not wait for the build to finish before returning.
pub trait BuildBackend: Send {
    fn start_build(
        &mut self,
        package: PackagePath,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Real backend used in production: one spawned Tokio task per build.
pub struct RealBuildBackend {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    ctx: Arc<BuildContext>,
}

impl RealBuildBackend {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, ctx: BuildContext) -> Self {
        Self {
            runtime_tx,
            ctx: Arc::new(ctx),
        }
    }
}

impl BuildBackend for RealBuildBackend {
    fn start_build(
        &mut self,
        package: PackagePath,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let ctx = Arc::clone(&self.ctx);

        Box::pin(async move {
            tokio::spawn(run_build(package, ctx, tx));
            Ok(())
        })
    }
}
