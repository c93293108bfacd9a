//! Configuration file loading and validation.
//!
//! The switcher consumes a static JSON table of application descriptors plus
//! a strategy selection. Loading happens once at startup; the descriptor
//! table is immutable afterwards.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::descriptor::{ApplicationDescriptor, LaunchAction};
use crate::error::SwitchError;

/// Which termination/launch strategy the orchestrator is wired with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Manual signal-based termination and detached spawn.
    #[default]
    Process,
    /// Delegate stop/start/readiness to systemd units.
    Systemd,
}

/// Top-level configuration file contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitcherConfig {
    #[serde(default)]
    pub strategy: StrategyKind,

    /// Application switched to when the CLI is invoked without one.
    #[serde(default)]
    pub default_app: Option<String>,

    pub applications: Vec<ApplicationDescriptor>,
}

impl SwitcherConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, SwitchError> {
        debug!(path = %path.display(), "loading switcher configuration");
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SwitchError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    /// Parse and validate configuration from a JSON string.
    pub fn from_json(raw: &str) -> Result<Self, SwitchError> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| SwitchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Look up a descriptor by id.
    #[must_use]
    pub fn application(&self, id: &str) -> Option<&ApplicationDescriptor> {
        self.applications.iter().find(|app| app.id == id)
    }

    fn validate(&self) -> Result<(), SwitchError> {
        if self.applications.is_empty() {
            return Err(SwitchError::Config(
                "no applications configured".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        for app in &self.applications {
            if app.id.is_empty() {
                return Err(SwitchError::Config(
                    "application with empty id".to_string(),
                ));
            }
            if !seen.insert(app.id.as_str()) {
                return Err(SwitchError::Config(format!(
                    "duplicate application id: {}",
                    app.id
                )));
            }
            // The process strategy can only stop what it can find by name.
            if self.strategy == StrategyKind::Process
                && app.process_names.is_empty()
                && matches!(app.launch, LaunchAction::Spawn { .. })
            {
                return Err(SwitchError::Config(format!(
                    "{}: process strategy requires at least one process name",
                    app.id
                )));
            }
        }

        if let Some(default) = &self.default_app {
            if seen.contains(default.as_str()) {
                return Ok(());
            }
            return Err(SwitchError::Config(format!(
                "default_app {default} is not a configured application"
            )));
        }
        Ok(())
    }
}

/// Default configuration location: `<config dir>/seatswitch/config.json`.
pub fn default_config_path() -> Result<PathBuf, SwitchError> {
    dirs::config_dir()
        .map(|dir| dir.join("seatswitch").join("config.json"))
        .ok_or_else(|| SwitchError::Config("no user configuration directory".to_string()))
}
