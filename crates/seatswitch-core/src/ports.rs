//! Strategy port implemented by the runtime.
//!
//! The orchestrator drives a [`SeatStrategy`] and owns all seat state; a
//! strategy is a stateless function over the descriptor it is handed. Two
//! implementations exist in `seatswitch-runtime`: manual signal-based
//! termination with a detached spawn, and delegation to systemd units. They
//! are interchangeable behind this contract and selected by configuration.

use std::fmt;

use async_trait::async_trait;

use crate::descriptor::ApplicationDescriptor;
use crate::error::SwitchError;
use crate::switch::StopRecord;

/// Stop/start/probe operations over a single application.
#[async_trait]
pub trait SeatStrategy: Send + Sync + fmt::Debug {
    /// Drive the application's process family through graceful-then-forced
    /// shutdown. Stopping an already-stopped application succeeds immediately
    /// with an empty record. Surviving pids are reported in the record, not
    /// as an error.
    async fn stop(&self, app: &ApplicationDescriptor) -> Result<StopRecord, SwitchError>;

    /// Launch the application and verify it reached a running state within
    /// its settle window. One settle delay plus one probe is the full
    /// contract; no retry loop.
    async fn launch(&self, app: &ApplicationDescriptor) -> Result<(), SwitchError>;

    /// Evaluate the readiness probe without launching anything. Used for the
    /// cheap already-active re-check.
    async fn is_running(&self, app: &ApplicationDescriptor) -> Result<bool, SwitchError>;
}
