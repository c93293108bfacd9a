//! The two interchangeable termination/launch strategies behind the
//! orchestrator contract, selected by configuration.

mod process;
mod systemd;

use std::sync::Arc;

use seatswitch_core::{SeatStrategy, StrategyKind};

use crate::systemd::Systemctl;

pub use process::ProcessSeatStrategy;
pub use systemd::SystemdSeatStrategy;

/// Build the configured strategy.
#[must_use]
pub fn strategy_for(kind: StrategyKind, systemctl: Systemctl) -> Arc<dyn SeatStrategy> {
    match kind {
        StrategyKind::Process => Arc::new(ProcessSeatStrategy::new(systemctl)),
        StrategyKind::Systemd => Arc::new(SystemdSeatStrategy::new(systemctl)),
    }
}
