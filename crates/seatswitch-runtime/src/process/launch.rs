//! Launch engine: detached spawn or unit start, then a single readiness
//! probe after the descriptor's settle delay.

use std::process::Stdio;

use tokio::process::Command;
use tokio::time::sleep;
use tracing::{debug, info};

use seatswitch_core::{ApplicationDescriptor, LaunchAction, ReadinessProbe, SwitchError};

use super::registry::ProcessRegistry;
use crate::systemd::Systemctl;

/// Starts applications and verifies they reach a running state.
///
/// The contract is one settle delay plus one probe; there is no retry loop
/// here. Callers that want retries layer them on top.
#[derive(Debug, Default)]
pub struct LaunchEngine {
    registry: ProcessRegistry,
    systemctl: Systemctl,
}

impl LaunchEngine {
    #[must_use]
    pub fn new(systemctl: Systemctl) -> Self {
        Self {
            registry: ProcessRegistry::new(),
            systemctl,
        }
    }

    /// Execute the descriptor's launch action, wait the settle delay, then
    /// evaluate the readiness probe once.
    pub async fn start(&self, app: &ApplicationDescriptor) -> Result<(), SwitchError> {
        match &app.launch {
            LaunchAction::Spawn {
                program,
                args,
                env,
                working_dir,
            } => {
                let pid = spawn_detached(program, args, env, working_dir.as_deref())?;
                info!(app = %app.id, %program, pid, "spawned detached");
            }
            LaunchAction::Unit(unit) => {
                self.systemctl.start(unit).await?;
                info!(app = %app.id, unit, "requested unit start");
            }
        }

        sleep(app.settle_delay()).await;

        if self.probe(app).await? {
            debug!(app = %app.id, "readiness probe confirmed");
            Ok(())
        } else {
            Err(SwitchError::LaunchNotObserved {
                app: app.id.clone(),
            })
        }
    }

    /// Evaluate the readiness probe without launching anything.
    pub async fn probe(&self, app: &ApplicationDescriptor) -> Result<bool, SwitchError> {
        match app.readiness_probe() {
            ReadinessProbe::ProcessName(name) => Ok(self.registry.any_alive(&[name])),
            ReadinessProbe::UnitActive(unit) => self.systemctl.is_active(&unit).await,
        }
    }
}

/// Spawn a process detached from the switcher: its own process group, null
/// stdio, and the descriptor-supplied environment layered over the
/// inherited one so it can reach the display session.
fn spawn_detached(
    program: &str,
    args: &[String],
    env: &std::collections::BTreeMap<String, String>,
    working_dir: Option<&std::path::Path>,
) -> Result<u32, SwitchError> {
    let mut command = Command::new(program);
    command
        .args(args)
        .envs(env)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    if let Some(dir) = working_dir {
        command.current_dir(dir);
    }
    #[cfg(unix)]
    command.process_group(0);

    let child = command.spawn().map_err(|source| SwitchError::Spawn {
        program: program.to_string(),
        source,
    })?;
    // The handle is dropped without waiting; the process keeps running on
    // its own and is reaped by the runtime or init.
    Ok(child.id().unwrap_or_default())
}
