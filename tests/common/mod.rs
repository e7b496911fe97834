#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use autotest::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions};
use autotest::errors::Result;
use autotest::exec::BuildBackend;
use autotest::graph::PackagePath;
use autotest_test_utils::fake_backend::FakeBuildBackend;

pub use autotest_test_utils::{init_tracing, with_timeout};

/// Spawn a runtime over `backend`, fed by the returned sender.
pub fn spawn_runtime<B>(
    backend: B,
    rx: mpsc::Receiver<RuntimeEvent>,
    exit_when_idle: bool,
) -> JoinHandle<Result<()>>
where
    B: BuildBackend + 'static,
{
    let core = CoreRuntime::new(RuntimeOptions { exit_when_idle });
    tokio::spawn(Runtime::new(core, rx, backend).run())
}

/// Channel plus a fake backend that completes every build immediately.
pub fn fake_backend() -> (
    mpsc::Sender<RuntimeEvent>,
    mpsc::Receiver<RuntimeEvent>,
    FakeBuildBackend,
    Arc<Mutex<Vec<PackagePath>>>,
) {
    let (tx, rx) = mpsc::channel::<RuntimeEvent>(64);
    let built = Arc::new(Mutex::new(Vec::new()));
    let backend = FakeBuildBackend::new(tx.clone(), Arc::clone(&built));
    (tx, rx, backend, built)
}
