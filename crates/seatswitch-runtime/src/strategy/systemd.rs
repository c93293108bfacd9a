//! Service-backed strategy: delegate stop/start/readiness to systemd units
//! and rely on the supervisor's own shutdown and restart semantics.

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::info;

use seatswitch_core::{ApplicationDescriptor, SeatStrategy, StopRecord, SwitchError};

use crate::systemd::Systemctl;

/// Unit delegation. Preferred when supervised, restart-on-crash behavior
/// matters more than fine-grained manual control.
#[derive(Debug)]
pub struct SystemdSeatStrategy {
    ctl: Systemctl,
}

impl SystemdSeatStrategy {
    #[must_use]
    pub const fn new(ctl: Systemctl) -> Self {
        Self { ctl }
    }
}

#[async_trait]
impl SeatStrategy for SystemdSeatStrategy {
    async fn stop(&self, app: &ApplicationDescriptor) -> Result<StopRecord, SwitchError> {
        let unit = app.unit_name();
        // `systemctl stop` on an inactive unit succeeds, which keeps this
        // idempotent for free. The supervisor owns the process family, so
        // there are no pids to report.
        self.ctl.stop(&unit).await?;
        info!(app = %app.id, unit, "unit stopped");
        Ok(StopRecord::already_stopped(&app.id))
    }

    async fn launch(&self, app: &ApplicationDescriptor) -> Result<(), SwitchError> {
        let unit = app.unit_name();
        self.ctl.start(&unit).await?;
        sleep(app.settle_delay()).await;
        if self.ctl.is_active(&unit).await? {
            info!(app = %app.id, unit, "unit active");
            Ok(())
        } else {
            Err(SwitchError::LaunchNotObserved {
                app: app.id.clone(),
            })
        }
    }

    async fn is_running(&self, app: &ApplicationDescriptor) -> Result<bool, SwitchError> {
        self.ctl.is_active(&app.unit_name()).await
    }
}
