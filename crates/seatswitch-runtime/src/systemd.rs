//! Thin wrapper over `systemctl`.
//!
//! The control binary is a parameter so the wrapper can be exercised in
//! tests without a running service manager.

use tokio::process::Command;
use tracing::debug;

use seatswitch_core::SwitchError;

/// Handle to the service supervisor's control command.
#[derive(Debug, Clone)]
pub struct Systemctl {
    program: String,
    /// Manage user units (`systemctl --user`) instead of system units.
    user: bool,
}

impl Default for Systemctl {
    fn default() -> Self {
        Self {
            program: "systemctl".to_string(),
            user: false,
        }
    }
}

impl Systemctl {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different control binary. Tests point this at `true`/`false`.
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            user: false,
        }
    }

    /// Manage user units instead of system units.
    #[must_use]
    pub const fn user_mode(mut self, user: bool) -> Self {
        self.user = user;
        self
    }

    async fn run(&self, verb: &str, unit: &str) -> Result<std::process::Output, SwitchError> {
        let mut command = Command::new(&self.program);
        if self.user {
            command.arg("--user");
        }
        command.arg(verb).arg(unit);
        debug!(program = %self.program, verb, unit, "running service supervisor command");
        command
            .output()
            .await
            .map_err(|e| SwitchError::Unit(format!("failed to run {}: {e}", self.program)))
    }

    /// `systemctl start <unit>`.
    pub async fn start(&self, unit: &str) -> Result<(), SwitchError> {
        let output = self.run("start", unit).await?;
        if output.status.success() {
            return Ok(());
        }
        Err(SwitchError::Unit(format!(
            "start {unit} exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }

    /// `systemctl stop <unit>`.
    pub async fn stop(&self, unit: &str) -> Result<(), SwitchError> {
        let output = self.run("stop", unit).await?;
        if output.status.success() {
            return Ok(());
        }
        Err(SwitchError::Unit(format!(
            "stop {unit} exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }

    /// `systemctl is-active <unit>`: exit 0 means active; any other exit
    /// status means inactive/failed/unknown.
    pub async fn is_active(&self, unit: &str) -> Result<bool, SwitchError> {
        let output = self.run("is-active", unit).await?;
        Ok(output.status.success())
    }
}
