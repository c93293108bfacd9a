//! CLI-specific error type and exit-code mapping.

use seatswitch_core::SwitchError;
use thiserror::Error;

/// Errors surfaced at the CLI edge.
#[derive(Debug, Error)]
pub enum CliError {
    /// Switch-level error from the orchestrator.
    #[error("{0}")]
    Switch(#[from] SwitchError),

    /// Argument problems not caught by the parser.
    #[error("invalid arguments: {0}")]
    Arguments(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 1: general error
    /// - 2: usage error (unknown application, bad arguments)
    /// - 64-78: sysexits.h categories
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Switch(err) => match err {
                SwitchError::Busy => 75,         // EX_TEMPFAIL: retry later
                SwitchError::NotFound(_) => 2,   // EX_USAGE
                SwitchError::Config(_) => 78,    // EX_CONFIG
                SwitchError::Spawn { .. }
                | SwitchError::Unit(_)
                | SwitchError::Unsupported => 71, // EX_OSERR
                SwitchError::LaunchNotObserved { .. } => 1,
            },
            Self::Arguments(_) => 2,
        }
    }
}
