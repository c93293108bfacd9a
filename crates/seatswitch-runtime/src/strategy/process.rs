//! Signal-based strategy: resolve the family, escalate SIGTERM → SIGKILL,
//! spawn detached, probe by process presence.

use async_trait::async_trait;

use seatswitch_core::{ApplicationDescriptor, SeatStrategy, StopRecord, SwitchError};

use crate::process::{LaunchEngine, ProcessRegistry, termination};
use crate::systemd::Systemctl;

/// Manual process control. This is the default strategy; it works without a
/// service supervisor but gives up restart-on-crash supervision.
#[derive(Debug)]
pub struct ProcessSeatStrategy {
    registry: ProcessRegistry,
    launcher: LaunchEngine,
}

impl ProcessSeatStrategy {
    #[must_use]
    pub fn new(systemctl: Systemctl) -> Self {
        Self {
            registry: ProcessRegistry::new(),
            launcher: LaunchEngine::new(systemctl),
        }
    }
}

#[async_trait]
impl SeatStrategy for ProcessSeatStrategy {
    async fn stop(&self, app: &ApplicationDescriptor) -> Result<StopRecord, SwitchError> {
        // The family is re-derived from the live table on every stop; the
        // orchestrator's bookkeeping is never trusted here.
        let family = self.registry.family(&app.process_names);
        termination::stop_family(
            &app.id,
            &family,
            app.quit_hook.as_ref(),
            app.grace_period(),
            app.force_delay(),
        )
        .await
    }

    async fn launch(&self, app: &ApplicationDescriptor) -> Result<(), SwitchError> {
        self.launcher.start(app).await
    }

    async fn is_running(&self, app: &ApplicationDescriptor) -> Result<bool, SwitchError> {
        self.launcher.probe(app).await
    }
}
