//! Process runtime for seatswitch: family resolution, termination, launch,
//! and the orchestrating state machine over them.
//!
//! The orchestrator drives one of two interchangeable strategies:
//! - [`ProcessSeatStrategy`]: manual SIGTERM/SIGKILL escalation over a
//!   leaf-first process family plus a detached spawn.
//! - [`SystemdSeatStrategy`]: delegation to systemd units, relying on the
//!   supervisor's own shutdown and readiness semantics.

pub mod orchestrator;
pub mod process;
pub mod strategy;
pub mod systemd;

pub use orchestrator::Orchestrator;
pub use process::{LaunchEngine, ProcessHandle, ProcessRegistry};
pub use strategy::{ProcessSeatStrategy, SystemdSeatStrategy, strategy_for};
pub use systemd::Systemctl;
