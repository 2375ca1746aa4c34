// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! The terminal belongs to the TUI, so logs go to a file.

use anyhow::{Context, Result, anyhow};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "ROWDESK_LOG";
const DEFAULT_FILTER: &str = "warn";

pub fn default_log_path() -> Result<PathBuf> {
    let data_root = dirs::data_local_dir()
        .ok_or_else(|| anyhow!("cannot resolve local data directory for the log file"))?;
    Ok(data_root.join(crate::config::APP_NAME).join("rowdesk.log"))
}

/// Falls back to `warn` when the directive is missing or malformed.
pub fn build_filter(raw: Option<&str>) -> EnvFilter {
    raw.map(str::trim)
        .filter(|directive| !directive.is_empty())
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

pub fn init(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let filter = build_filter(std::env::var(LOG_ENV).ok().as_deref());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|error| anyhow!("initialize logging: {error}"))
}

#[cfg(test)]
mod tests {
    use super::{build_filter, default_log_path};
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn missing_or_blank_directive_defaults_to_warn() {
        assert_eq!(build_filter(None).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(
            build_filter(Some("  ")).max_level_hint(),
            Some(LevelFilter::WARN)
        );
    }

    #[test]
    fn explicit_directive_is_used() {
        let filter = build_filter(Some("rowdesk_api=debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn malformed_directive_falls_back() {
        let filter = build_filter(Some("rowdesk=loud"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn log_path_lives_under_app_dir() {
        if let Ok(path) = default_log_path() {
            assert!(path.ends_with("rowdesk/rowdesk.log"));
        }
    }
}
