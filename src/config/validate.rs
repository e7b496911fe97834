// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{AutotestError, Result};
use crate::watch::patterns::IgnoreSet;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::AutotestError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        let ignore = compile_globs("[watch].ignore", &raw.watch.ignore)?;
        let skip_dirs = compile_globs("[watch].skip_dirs", &raw.watch.skip_dirs)?;
        Ok(ConfigFile::new_unchecked(
            raw.config, raw.watch, raw.build, ignore, skip_dirs,
        ))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_roots(cfg)?;
    validate_global_config(cfg)?;
    validate_build_section(cfg)?;
    Ok(())
}

fn ensure_has_roots(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.roots.is_empty() {
        return Err(AutotestError::ConfigError(
            "no source roots: pass --root, set [config].roots or set $GOPATH".to_string(),
        ));
    }
    for root in cfg.config.roots.iter() {
        if root.as_os_str().is_empty() {
            return Err(AutotestError::ConfigError(
                "[config].roots must not contain empty paths".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    // stale_edges is strongly typed and validated during deserialization.

    if cfg.config.propagation_depth == 0 {
        return Err(AutotestError::ConfigError(
            "[config].propagation_depth must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_build_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.build.cmd.trim().is_empty() {
        return Err(AutotestError::ConfigError(
            "[build].cmd must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn compile_globs(field: &str, patterns: &[String]) -> Result<IgnoreSet> {
    IgnoreSet::new(patterns)
        .map_err(|err| AutotestError::ConfigError(format!("{field}: {err:#}")))
}
