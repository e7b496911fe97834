// src/config/mod.rs

//! Configuration loading and validation for autotest.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and resolve source roots (`loader.rs`).
//! - Validate basic invariants (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    default_config_path, load_and_validate, load_from_path, load_or_default, resolve_roots,
    roots_from_gopath,
};
pub use model::{BuildSection, ConfigFile, ConfigSection, RawConfigFile, WatchSection};
