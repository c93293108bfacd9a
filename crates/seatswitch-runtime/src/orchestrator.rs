//! Lifecycle orchestrator: the state machine that hands the seat from one
//! application to another.
//!
//! Exactly one switch runs at a time; a caller arriving during an in-flight
//! switch gets [`SwitchError::Busy`] immediately and is never queued. Seat
//! state is written exclusively here; strategies are stateless functions
//! over the descriptors they are handed. The switch algorithm re-derives
//! reality from the OS (it stops every other known application, not just
//! the believed-active one) so drifted bookkeeping cannot leave a stale
//! process holding the seat.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use seatswitch_core::{
    ApplicationDescriptor, SeatState, SeatStatus, SeatStrategy, StopRecord, SwitchError,
    SwitchOutcome, SwitchRequest, SwitchResult,
};

/// Seat bookkeeping. `current` is authoritative only as last known here.
#[derive(Debug)]
struct Seat {
    state: SeatState,
    current: Option<String>,
    since: DateTime<Utc>,
}

/// Serializes switches and owns the seat state.
#[derive(Debug)]
pub struct Orchestrator {
    apps: Vec<ApplicationDescriptor>,
    strategy: Arc<dyn SeatStrategy>,
    /// Held for the duration of a switch; `try_lock` failure is `Busy`.
    switch_lock: Mutex<()>,
    /// Written only while `switch_lock` is held; read by status queries.
    seat: RwLock<Seat>,
}

impl Orchestrator {
    #[must_use]
    pub fn new(apps: Vec<ApplicationDescriptor>, strategy: Arc<dyn SeatStrategy>) -> Self {
        Self {
            apps,
            strategy,
            switch_lock: Mutex::new(()),
            seat: RwLock::new(Seat {
                state: SeatState::Idle,
                current: None,
                since: Utc::now(),
            }),
        }
    }

    fn descriptor(&self, id: &str) -> Result<&ApplicationDescriptor, SwitchError> {
        self.apps
            .iter()
            .find(|app| app.id == id)
            .ok_or_else(|| SwitchError::NotFound(id.to_string()))
    }

    async fn set_state(&self, state: SeatState, current: Option<String>) {
        let mut seat = self.seat.write().await;
        seat.state = state;
        seat.current = current;
        seat.since = Utc::now();
    }

    /// Hand the seat to `app_id`.
    ///
    /// Returns `Busy` while another switch is in flight and `NotFound` for
    /// unknown ids, both without mutating any state. Launch failures are
    /// reported inside the result as a `Failed` outcome; surviving processes
    /// of previous applications mark the result `Degraded` rather than
    /// failing it.
    pub async fn switch(&self, app_id: &str) -> Result<SwitchResult, SwitchError> {
        let _guard = self
            .switch_lock
            .try_lock()
            .map_err(|_| SwitchError::Busy)?;
        let next = self.descriptor(app_id)?;
        let request = SwitchRequest::new(app_id);
        let started = Instant::now();
        info!(app = %request.app, requested_at = %request.requested_at, "switch requested");

        // Cheap idempotent path: the believed-running application only gets
        // a readiness re-check. A failed re-check means the bookkeeping
        // drifted, so fall through to the full cycle instead of reporting a
        // false success.
        let believed_current = {
            let seat = self.seat.read().await;
            matches!(seat.state, SeatState::Running(_))
                && seat.current.as_deref() == Some(app_id)
        };
        if believed_current {
            match self.strategy.is_running(next).await {
                Ok(true) => {
                    debug!(app = %request.app, "already running, readiness re-confirmed");
                    return Ok(SwitchResult {
                        app: request.app,
                        outcome: SwitchOutcome::Success,
                        elapsed_ms: elapsed_ms(started),
                        stops: Vec::new(),
                        survivors: Vec::new(),
                    });
                }
                Ok(false) => {
                    info!(app = %request.app, "believed running but probe failed, full switch");
                }
                Err(e) => {
                    warn!(app = %request.app, error = %e, "readiness re-check failed, full switch");
                }
            }
        }

        // Stop every OTHER known application, not only the believed-active
        // one. Stop failures are recorded, never fatal.
        self.set_state(SeatState::SwitchingOut(request.app.clone()), None)
            .await;
        let mut stops = Vec::new();
        let mut survivors = Vec::new();
        for other in self.apps.iter().filter(|app| app.id != app_id) {
            match self.strategy.stop(other).await {
                Ok(record) => {
                    survivors.extend(record.survivors.iter().copied());
                    stops.push(record);
                }
                Err(e) => {
                    warn!(app = %other.id, error = %e, "stop failed, continuing switch");
                    stops.push(StopRecord::stop_failed(&other.id, e.to_string()));
                }
            }
        }

        self.set_state(SeatState::SwitchingIn(request.app.clone()), None)
            .await;
        match self.strategy.launch(next).await {
            Ok(()) => {
                let outcome = if survivors.is_empty() {
                    SwitchOutcome::Success
                } else {
                    warn!(app = %request.app, ?survivors, "switch degraded by surviving processes");
                    SwitchOutcome::Degraded
                };
                self.set_state(
                    SeatState::Running(request.app.clone()),
                    Some(request.app.clone()),
                )
                .await;
                info!(app = %request.app, elapsed_ms = elapsed_ms(started), "switch complete");
                Ok(SwitchResult {
                    app: request.app,
                    outcome,
                    elapsed_ms: elapsed_ms(started),
                    stops,
                    survivors,
                })
            }
            Err(e) => {
                let reason = e.to_string();
                warn!(app = %request.app, %reason, "switch failed");
                self.set_state(SeatState::Failed(reason.clone()), None).await;
                Ok(SwitchResult {
                    app: request.app,
                    outcome: SwitchOutcome::Failed { reason },
                    elapsed_ms: elapsed_ms(started),
                    stops,
                    survivors,
                })
            }
        }
    }

    /// Stop a single application without starting another. Runs under the
    /// same serialization lock as `switch`.
    pub async fn stop(&self, app_id: &str) -> Result<StopRecord, SwitchError> {
        let _guard = self
            .switch_lock
            .try_lock()
            .map_err(|_| SwitchError::Busy)?;
        let app = self.descriptor(app_id)?;
        let record = self.strategy.stop(app).await?;
        let was_current = {
            let seat = self.seat.read().await;
            seat.current.as_deref() == Some(app_id)
        };
        if was_current {
            self.set_state(SeatState::Idle, None).await;
        }
        Ok(record)
    }

    /// Launch a single application without stopping the others.
    pub async fn start(&self, app_id: &str) -> Result<(), SwitchError> {
        let _guard = self
            .switch_lock
            .try_lock()
            .map_err(|_| SwitchError::Busy)?;
        let app = self.descriptor(app_id)?;
        self.strategy.launch(app).await?;
        self.set_state(
            SeatState::Running(app_id.to_string()),
            Some(app_id.to_string()),
        )
        .await;
        Ok(())
    }

    /// Probe every configured application and return the ids observed
    /// running, re-deriving seat reality from the OS instead of trusting
    /// the bookkeeping. Probe errors count as not running.
    pub async fn observe_running(&self) -> Vec<String> {
        let mut running = Vec::new();
        for app in &self.apps {
            if matches!(self.strategy.is_running(app).await, Ok(true)) {
                running.push(app.id.clone());
            }
        }
        running
    }

    /// Snapshot of the seat state for status queries. Never blocks behind an
    /// in-flight switch, so callers can observe the intermediate states.
    pub async fn status(&self) -> SeatStatus {
        let seat = self.seat.read().await;
        SeatStatus {
            state: seat.state.clone(),
            current_app: seat.current.clone(),
            since: seat.since,
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
