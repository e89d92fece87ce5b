use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use timesheet_core::{Granularity, GridSettings, TimeReference, WorkflowSettings};

/// Which clock the grid buckets "now" and entry dates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeReferenceSetting {
    Utc,
    #[default]
    Local,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Base URL of the timesheet API, e.g. "http://localhost:8080"
    pub api_url: String,
    /// Static bearer token sent with every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    pub time_reference: TimeReferenceSetting,
    /// Width of a grid slot in minutes
    pub slot_minutes: u16,
    /// Step between start/end options in the entry form
    pub option_step: u16,
    /// Shortest entry that can be saved, in minutes
    pub minimum_duration: u16,
    pub day_start_hour: u8,
    pub day_end_hour: u8,
}

impl Default for TuiConfig {
    fn default() -> Self {
        let grid = GridSettings::default();
        let workflow = WorkflowSettings::default();
        Self {
            api_url: "http://localhost:8080".to_string(),
            api_token: None,
            time_reference: TimeReferenceSetting::default(),
            slot_minutes: grid.slot().as_minutes(),
            option_step: workflow.option_step.as_minutes(),
            minimum_duration: workflow.minimum_duration.as_minutes(),
            day_start_hour: grid.day_start_hour(),
            day_end_hour: grid.day_end_hour(),
        }
    }
}

impl TuiConfig {
    pub fn config_dir() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Cannot determine config directory")?
            .join("timesheet-tui"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from disk, overridden by `TIMESHEET__*` environment
    /// variables. Missing file or keys fall back to defaults.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    fn load_from(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("TIMESHEET")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read config at {}", path.display()))?;

        settings
            .try_deserialize()
            .with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(&path, raw)?;
        Ok(())
    }

    /// Resolve the clock reference. Reading the local offset is only
    /// reliable before any other thread has been spawned.
    pub fn time_reference(&self) -> TimeReference {
        match self.time_reference {
            TimeReferenceSetting::Utc => TimeReference::Utc,
            TimeReferenceSetting::Local => TimeReference::local_or_utc(),
        }
    }

    pub fn grid_settings(&self) -> Result<GridSettings> {
        let slot = Granularity::minutes(self.slot_minutes).context("Invalid slot_minutes")?;
        GridSettings::new(slot, self.day_start_hour, self.day_end_hour)
            .context("Invalid day_start_hour/day_end_hour")
    }

    pub fn workflow_settings(&self) -> Result<WorkflowSettings> {
        let step = Granularity::minutes(self.option_step).context("Invalid option_step")?;
        let minimum =
            Granularity::minutes(self.minimum_duration).context("Invalid minimum_duration")?;
        Ok(WorkflowSettings::default()
            .with_option_step(step)
            .with_minimum_duration(minimum))
    }
}
