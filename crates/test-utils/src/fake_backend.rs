use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use autotest::engine::{BuildOutcome, RuntimeEvent};
use autotest::errors::Result;
use autotest::exec::BuildBackend;
use autotest::graph::PackagePath;

/// A fake backend that:
/// - records which packages were "built"
/// - immediately reports BuildCompleted(Success) for each of them.
pub struct FakeBuildBackend {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    built: Arc<Mutex<Vec<PackagePath>>>,
}

impl FakeBuildBackend {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, built: Arc<Mutex<Vec<PackagePath>>>) -> Self {
        Self { runtime_tx, built }
    }
}

impl BuildBackend for FakeBuildBackend {
    fn start_build(
        &mut self,
        package: PackagePath,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let built = Arc::clone(&self.built);

        Box::pin(async move {
            built.lock().unwrap().push(package.clone());

            tx.send(RuntimeEvent::BuildCompleted {
                package,
                outcome: BuildOutcome::Success,
            })
            .await
            .map_err(anyhow::Error::from)?;
            Ok(())
        })
    }
}

/// A backend that never completes builds on its own.
///
/// Every started package is forwarded on `started`; the test decides when
/// (and with which outcome) to post `BuildCompleted`.
pub struct ManualBuildBackend {
    started: mpsc::UnboundedSender<PackagePath>,
}

impl ManualBuildBackend {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PackagePath>) {
        let (started, rx) = mpsc::unbounded_channel();
        (Self { started }, rx)
    }
}

impl BuildBackend for ManualBuildBackend {
    fn start_build(
        &mut self,
        package: PackagePath,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let started = self.started.clone();
        Box::pin(async move {
            started.send(package).map_err(anyhow::Error::from)?;
            Ok(())
        })
    }
}
