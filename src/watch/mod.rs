// src/watch/mod.rs

//! Source tree watching and change routing.
//!
//! This module is responsible for:
//! - Walking source trees into the import graph ([`scanner`]).
//! - Registering directories with a cross-platform watcher (`notify`).
//! - Filtering editor temporaries ([`patterns`]).
//! - Turning each change into build requests ([`router`]).
//!
//! It does **not** decide when builds run; that is the engine's job.

pub mod patterns;
pub mod router;
pub mod scanner;
pub mod watcher;

pub use patterns::{IgnoreSet, DEFAULT_IGNORE, DEFAULT_SKIP_DIRS};
pub use router::ChangeRouter;
pub use scanner::{ScanSummary, TreeScanner};
pub use watcher::{
    create_watcher, is_change, spawn_router, NotifyRegistrar, NullRegistrar, WatchRegistrar,
};
