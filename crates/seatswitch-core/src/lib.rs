//! Core domain types and port definitions for seatswitch.
//!
//! This crate holds everything the switcher shares across adapters: the
//! application descriptor table, the switch result model, the seat state
//! machine vocabulary, and the strategy port the runtime implements. It has
//! no OS access of its own.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod ports;
pub mod switch;

// Re-export commonly used types for convenience
pub use config::{StrategyKind, SwitcherConfig, default_config_path};
pub use descriptor::{ApplicationDescriptor, LaunchAction, QuitHook, ReadinessProbe};
pub use error::SwitchError;
pub use ports::SeatStrategy;
pub use switch::{SeatState, SeatStatus, StopRecord, SwitchOutcome, SwitchRequest, SwitchResult};
