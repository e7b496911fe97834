// src/exec/mod.rs

//! Build execution layer.
//!
//! This module is responsible for actually running the configured test
//! command for a package, using `tokio::process::Command`, and reporting
//! back to the scheduling runtime via `RuntimeEvent`s.
//!
//! - [`worker`] resolves a package to its directory, lists the files that
//!   belong in the build and runs one build to completion.
//! - [`backend`] provides the `BuildBackend` trait and a concrete
//!   `RealBuildBackend` that the runtime uses in production, and which
//!   tests can replace with a fake implementation.

pub mod backend;
pub mod worker;

pub use backend::{BuildBackend, RealBuildBackend};
pub use worker::{eligible_files, run_build, BuildCommand, BuildContext};
