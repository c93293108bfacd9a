//! Static per-application metadata consumed by the switcher.
//!
//! A descriptor tells the runtime how to recognize an application's
//! processes, how to launch it, how to ask it to quit politely, and how long
//! to wait at each stage. Descriptors are loaded once from configuration and
//! never mutated afterwards.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How an application is brought onto the seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchAction {
    /// Spawn a detached process with the environment needed to reach the
    /// display session.
    Spawn {
        program: String,
        #[serde(default)]
        args: Vec<String>,
        /// Extra environment (e.g. `DISPLAY=:0`) layered over the inherited one.
        #[serde(default)]
        env: BTreeMap<String, String>,
        #[serde(default)]
        working_dir: Option<PathBuf>,
    },
    /// Ask the service supervisor to start a unit.
    Unit(String),
}

/// Readiness probe evaluated once after the settle delay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessProbe {
    /// A process with this name is visible in the process table.
    ProcessName(String),
    /// `systemctl is-active` reports the unit active.
    UnitActive(String),
}

/// An application-specific "ask nicely" command, invoked before any signal
/// is sent (e.g. `kodi-send --action Quit`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuitHook {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

const fn default_grace_secs() -> u64 {
    5
}

const fn default_force_secs() -> u64 {
    2
}

const fn default_settle_ms() -> u64 {
    1500
}

/// Everything the switcher knows about one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDescriptor {
    /// Stable identifier used by callers (`kodi`, `emulationstation`, ...).
    pub id: String,

    /// Human-readable name for listings; falls back to the id.
    #[serde(default)]
    pub display_name: Option<String>,

    /// Canonical process names this application runs under. The family
    /// resolver matches these against the live process table.
    #[serde(default)]
    pub process_names: Vec<String>,

    /// How to bring the application onto the seat.
    pub launch: LaunchAction,

    /// Optional cooperative shutdown command tried before signalling.
    #[serde(default)]
    pub quit_hook: Option<QuitHook>,

    /// Explicit readiness probe; when absent one is derived from the launch
    /// action (first process name, or the unit itself).
    #[serde(default)]
    pub readiness: Option<ReadinessProbe>,

    /// How long the process family gets to honor the graceful signal.
    #[serde(default = "default_grace_secs")]
    pub grace_secs: u64,

    /// How long to wait for the forced signal to take effect.
    #[serde(default = "default_force_secs")]
    pub force_secs: u64,

    /// Delay between launching and evaluating the readiness probe.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl ApplicationDescriptor {
    /// Name shown in listings.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }

    #[must_use]
    pub const fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_secs)
    }

    #[must_use]
    pub const fn force_delay(&self) -> Duration {
        Duration::from_secs(self.force_secs)
    }

    #[must_use]
    pub const fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// The service unit backing this application. Explicit `unit` launch
    /// actions name it directly; otherwise `<id>.service` by convention.
    #[must_use]
    pub fn unit_name(&self) -> String {
        match &self.launch {
            LaunchAction::Unit(unit) => unit.clone(),
            LaunchAction::Spawn { .. } => format!("{}.service", self.id),
        }
    }

    /// The effective readiness probe: the explicit one if configured, else
    /// derived from the launch action.
    #[must_use]
    pub fn readiness_probe(&self) -> ReadinessProbe {
        if let Some(probe) = &self.readiness {
            return probe.clone();
        }
        match &self.launch {
            LaunchAction::Unit(unit) => ReadinessProbe::UnitActive(unit.clone()),
            LaunchAction::Spawn { program, .. } => {
                // Default to the first canonical process name, falling back to
                // the program's file name.
                let name = self.process_names.first().cloned().unwrap_or_else(|| {
                    PathBuf::from(program)
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| program.clone())
                });
                ReadinessProbe::ProcessName(name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_descriptor() -> ApplicationDescriptor {
        serde_json::from_value(serde_json::json!({
            "id": "kodi",
            "process_names": ["kodi.bin", "kodi"],
            "launch": { "spawn": { "program": "/usr/bin/kodi", "env": { "DISPLAY": ":0" } } },
            "quit_hook": { "program": "kodi-send", "args": ["--action", "Quit"] },
            "grace_secs": 3
        }))
        .expect("descriptor should deserialize")
    }

    #[test]
    fn defaults_applied_on_deserialize() {
        let app = spawn_descriptor();
        assert_eq!(app.grace_period(), Duration::from_secs(3));
        assert_eq!(app.force_delay(), Duration::from_secs(2));
        assert_eq!(app.settle_delay(), Duration::from_millis(1500));
        assert_eq!(app.display_name(), "kodi");
    }

    #[test]
    fn readiness_derived_from_process_names() {
        let app = spawn_descriptor();
        assert_eq!(
            app.readiness_probe(),
            ReadinessProbe::ProcessName("kodi.bin".to_string())
        );
    }

    #[test]
    fn readiness_derived_from_program_when_no_names() {
        let app: ApplicationDescriptor = serde_json::from_value(serde_json::json!({
            "id": "moonlight",
            "launch": { "spawn": { "program": "/usr/bin/moonlight-qt" } }
        }))
        .unwrap();
        assert_eq!(
            app.readiness_probe(),
            ReadinessProbe::ProcessName("moonlight-qt".to_string())
        );
    }

    #[test]
    fn unit_launch_derives_unit_probe_and_name() {
        let app: ApplicationDescriptor = serde_json::from_value(serde_json::json!({
            "id": "retropie",
            "process_names": ["emulationstation"],
            "launch": { "unit": "emulationstation.service" }
        }))
        .unwrap();
        assert_eq!(app.unit_name(), "emulationstation.service");
        assert_eq!(
            app.readiness_probe(),
            ReadinessProbe::UnitActive("emulationstation.service".to_string())
        );
    }

    #[test]
    fn spawn_launch_defaults_unit_name_to_id() {
        let app = spawn_descriptor();
        assert_eq!(app.unit_name(), "kodi.service");
    }
}
