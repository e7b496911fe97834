// src/source/mod.rs

//! Source-level collaborators of the scanner and the build worker.
//!
//! Both are traits so that the graph and scheduling logic never depends on a
//! particular language. The shipped implementations target Go source trees:
//!
//! - [`imports`]: which packages a source file imports.
//! - [`eligibility`]: which files of a directory belong in a build, following
//!   the `go` tool's file name and build-constraint rules.

pub mod eligibility;
pub mod imports;

pub use eligibility::{FileMatcher, GoFileMatcher};
pub use imports::{GoImportExtractor, ImportError, ImportExtractor};
