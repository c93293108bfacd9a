//! Graceful-then-forced termination of a process family.
//!
//! SIGTERM → SIGKILL escalation with bounded polling. Survivors are a
//! diagnostic in the returned record, never an error: the switch proceeds to
//! launch the next application regardless.

use std::time::Duration;

use seatswitch_core::{QuitHook, StopRecord, SwitchError};

use super::registry::ProcessHandle;

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;
#[cfg(unix)]
use std::time::Instant;
#[cfg(unix)]
use tokio::time::sleep;
#[cfg(unix)]
use tracing::{debug, warn};

/// Fixed cadence for "is the family gone yet" checks.
#[cfg(unix)]
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A quit hook that has not finished by now is not going to help.
#[cfg(unix)]
const QUIT_HOOK_TIMEOUT: Duration = Duration::from_secs(2);

/// Drive `family` through graceful-then-forced shutdown.
///
/// 1. Invoke the application's quit hook, if any.
/// 2. SIGTERM every member in the given (leaf-first) order.
/// 3. Poll until the family is gone or `grace_period` elapses.
/// 4. SIGKILL every still-alive member; poll again up to `force_delay`.
///
/// Stopping an already-stopped family returns immediately with no signals
/// sent.
pub async fn stop_family(
    app_id: &str,
    family: &[ProcessHandle],
    quit_hook: Option<&QuitHook>,
    grace_period: Duration,
    force_delay: Duration,
) -> Result<StopRecord, SwitchError> {
    if family.is_empty() {
        return Ok(StopRecord::already_stopped(app_id));
    }

    #[cfg(unix)]
    {
        Ok(stop_family_unix(app_id, family, quit_hook, grace_period, force_delay).await)
    }

    #[cfg(not(unix))]
    {
        let _ = (quit_hook, grace_period, force_delay);
        Err(SwitchError::Unsupported)
    }
}

#[cfg(unix)]
async fn stop_family_unix(
    app_id: &str,
    family: &[ProcessHandle],
    quit_hook: Option<&QuitHook>,
    grace_period: Duration,
    force_delay: Duration,
) -> StopRecord {
    if let Some(hook) = quit_hook {
        run_quit_hook(app_id, hook).await;
    }

    // Phase 1: SIGTERM, leaves first.
    let mut signalled = Vec::new();
    for handle in family {
        match signal::kill(Pid::from_raw(handle.pid as i32), Signal::SIGTERM) {
            Ok(()) => signalled.push(handle.pid),
            Err(Errno::ESRCH) => {
                // Already gone between snapshot and signal.
            }
            Err(e) => {
                warn!(app = app_id, pid = handle.pid, error = %e, "SIGTERM failed");
                signalled.push(handle.pid);
            }
        }
    }

    let mut survivors = poll_until_gone(&signalled, grace_period).await;
    if survivors.is_empty() {
        debug!(app = app_id, count = signalled.len(), "family exited within grace period");
        return StopRecord {
            app: app_id.to_string(),
            signalled,
            survivors,
            error: None,
        };
    }

    // Phase 2: SIGKILL the holdouts.
    warn!(
        app = app_id,
        holdouts = ?survivors,
        "grace period elapsed, escalating to SIGKILL"
    );
    for pid in &survivors {
        if let Err(e) = signal::kill(Pid::from_raw(*pid as i32), Signal::SIGKILL) {
            if e != Errno::ESRCH {
                warn!(app = app_id, pid, error = %e, "SIGKILL failed");
            }
        }
    }
    survivors = poll_until_gone(&survivors, force_delay).await;
    if !survivors.is_empty() {
        warn!(app = app_id, survivors = ?survivors, "processes resisted SIGKILL");
    }

    StopRecord {
        app: app_id.to_string(),
        signalled,
        survivors,
        error: None,
    }
}

/// Run the application's cooperative quit command. Failures are logged and
/// otherwise ignored; the signal escalation follows either way.
#[cfg(unix)]
async fn run_quit_hook(app_id: &str, hook: &QuitHook) {
    debug!(app = app_id, program = %hook.program, "invoking quit hook");
    let mut command = tokio::process::Command::new(&hook.program);
    command
        .args(&hook.args)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .kill_on_drop(true);
    match tokio::time::timeout(QUIT_HOOK_TIMEOUT, command.status()).await {
        Ok(Ok(status)) if !status.success() => {
            debug!(app = app_id, ?status, "quit hook exited non-zero");
        }
        Ok(Err(e)) => debug!(app = app_id, error = %e, "quit hook failed to run"),
        Err(_) => debug!(app = app_id, "quit hook timed out"),
        Ok(Ok(_)) => {}
    }
}

/// Poll at [`POLL_INTERVAL`] until every pid is gone or the budget elapses.
/// Returns the pids still alive.
#[cfg(unix)]
async fn poll_until_gone(pids: &[u32], budget: Duration) -> Vec<u32> {
    let deadline = Instant::now() + budget;
    let mut remaining: Vec<u32> = pids.iter().copied().filter(|pid| alive(*pid)).collect();
    while !remaining.is_empty() && Instant::now() < deadline {
        sleep(POLL_INTERVAL).await;
        remaining.retain(|pid| alive(*pid));
    }
    remaining
}

/// Null-signal existence check. EPERM means the process exists but is not
/// ours, which still counts as alive.
#[cfg(unix)]
fn alive(pid: u32) -> bool {
    !matches!(
        signal::kill(Pid::from_raw(pid as i32), None),
        Err(Errno::ESRCH)
    )
}
