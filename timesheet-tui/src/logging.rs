use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::TuiConfig;

/// Send tracing output to a log file; the terminal belongs to the UI.
/// `RUST_LOG` overrides the default `info` filter.
pub fn init() -> Result<PathBuf> {
    let path = TuiConfig::config_dir()?.join("timesheet.log");
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file at {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();

    Ok(path)
}
