// src/graph/mod.rs

//! Package import graph.
//!
//! - [`store`] holds forward imports, the mirrored dependents index and the
//!   package -> directory index used to dispatch builds.
//! - [`roots`] turns directories into canonical, root-relative package paths.
//! - [`cycles`] reports import cycles for startup diagnostics.

/// Canonical, root-relative package path (e.g. `"github.com/acme/lib"`).
pub type PackagePath = String;

pub mod cycles;
pub mod roots;
pub mod store;

pub use cycles::import_cycles;
pub use roots::PackageRoots;
pub use store::{GraphStore, LocationIndex};
