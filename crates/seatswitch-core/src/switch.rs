//! Switch request/result model and the seat state vocabulary.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A request to hand the seat to another application.
#[derive(Debug, Clone)]
pub struct SwitchRequest {
    /// Target application id.
    pub app: String,
    /// When the request was accepted.
    pub requested_at: DateTime<Utc>,
}

impl SwitchRequest {
    #[must_use]
    pub fn new(app: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            requested_at: Utc::now(),
        }
    }
}

/// Overall outcome of a switch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchOutcome {
    /// The previous applications are gone and the target is running.
    Success,
    /// The target is running but at least one process of a previous
    /// application resisted termination.
    Degraded,
    /// The target was not observed running; the seat has no confirmed owner.
    Failed { reason: String },
}

/// What happened while stopping one application's process family.
///
/// A non-empty `survivors` list is a diagnostic, not a failure: the switch
/// proceeds to launch regardless.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StopRecord {
    /// Application the family belonged to.
    pub app: String,
    /// Pids that received the graceful signal, leaves first.
    pub signalled: Vec<u32>,
    /// Pids still alive after the forced signal and its delay.
    pub survivors: Vec<u32>,
    /// Why the stop action itself failed, if it did. Distinguishes a failed
    /// stop from a family that was already gone.
    pub error: Option<String>,
}

impl StopRecord {
    /// Record for an application whose family was already gone.
    #[must_use]
    pub fn already_stopped(app: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            ..Self::default()
        }
    }

    /// Record for a stop action that itself failed. The switch still
    /// proceeds; the failure travels in the result instead of aborting it.
    #[must_use]
    pub fn stop_failed(app: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Full account of one switch attempt. Every stop/start action's outcome is
/// recorded here, even when non-fatal.
#[derive(Debug, Clone, Serialize)]
pub struct SwitchResult {
    /// Application the seat was handed to.
    pub app: String,
    pub outcome: SwitchOutcome,
    /// Wall-clock time the attempt took, in milliseconds.
    pub elapsed_ms: u64,
    /// Per-application stop records, in the order the stops ran.
    pub stops: Vec<StopRecord>,
    /// All pids that resisted termination, aggregated across stops.
    pub survivors: Vec<u32>,
}

impl SwitchResult {
    /// True for outcomes that left the target application running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.outcome, SwitchOutcome::Success | SwitchOutcome::Degraded)
    }
}

/// Seat ownership state. Written exclusively by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "app")]
pub enum SeatState {
    /// No application is believed to own the seat.
    Idle,
    /// Other applications are being stopped on the way to this one.
    SwitchingOut(String),
    /// The target is launching and awaiting its readiness probe.
    SwitchingIn(String),
    /// This application is believed to own the seat.
    Running(String),
    /// The last switch failed; not sticky, the next switch is accepted.
    Failed(String),
}

/// Snapshot returned by status queries.
#[derive(Debug, Clone, Serialize)]
pub struct SeatStatus {
    pub state: SeatState,
    /// Believed-current application, as last known by the orchestrator.
    pub current_app: Option<String>,
    /// When the state last changed.
    pub since: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_still_counts_as_running() {
        let result = SwitchResult {
            app: "kodi".into(),
            outcome: SwitchOutcome::Degraded,
            elapsed_ms: 4200,
            stops: vec![],
            survivors: vec![4242],
        };
        assert!(result.is_running());

        let failed = SwitchResult {
            outcome: SwitchOutcome::Failed {
                reason: "not observed".into(),
            },
            ..result
        };
        assert!(!failed.is_running());
    }

    #[test]
    fn failed_stop_is_distinguishable_from_already_stopped() {
        let gone = StopRecord::already_stopped("kodi");
        assert!(gone.error.is_none());

        let failed = StopRecord::stop_failed("kodi", "unit stop failed");
        assert_eq!(failed.error.as_deref(), Some("unit stop failed"));
        assert!(failed.signalled.is_empty());
    }

    #[test]
    fn seat_state_serializes_with_tag() {
        let json = serde_json::to_value(SeatState::Running("kodi".into())).unwrap();
        assert_eq!(json["state"], "running");
        assert_eq!(json["app"], "kodi");

        let idle = serde_json::to_value(SeatState::Idle).unwrap();
        assert_eq!(idle["state"], "idle");
    }
}
