//! Process-level building blocks: family resolution, graceful termination,
//! and launch with readiness verification.

pub mod launch;
pub mod registry;
pub mod termination;

pub use launch::LaunchEngine;
pub use registry::{ProcessHandle, ProcessRegistry};
