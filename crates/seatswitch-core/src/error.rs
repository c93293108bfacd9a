//! Error taxonomy for switch operations.

use thiserror::Error;

/// Errors returned by switch, stop and start operations.
///
/// Nothing here is fatal to the switcher process itself; every failure is
/// surfaced to the caller, who decides whether to retry or fall back to a
/// known-good application.
#[derive(Debug, Error)]
pub enum SwitchError {
    /// Another switch is already in flight. No state was mutated; the caller
    /// should retry later.
    #[error("another switch is already in progress")]
    Busy,

    /// The requested application id is not in the descriptor table.
    #[error("unknown application: {0}")]
    NotFound(String),

    /// The readiness probe did not observe the application within the settle
    /// window. The previous application's processes are already gone, so the
    /// seat is left without a confirmed owner.
    #[error("{app} was not observed running after launch")]
    LaunchNotObserved { app: String },

    /// Spawning the launch command failed outright.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A service supervisor command failed.
    #[error("service supervisor: {0}")]
    Unit(String),

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// Signal-based termination is not available on this platform.
    #[error("process termination is not supported on this platform")]
    Unsupported,
}

impl SwitchError {
    /// True if this error indicates a temporary condition where retrying
    /// may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_is_retryable() {
        assert!(SwitchError::Busy.is_retryable());
        assert!(!SwitchError::NotFound("kodi".into()).is_retryable());
    }

    #[test]
    fn display_names_the_application() {
        let err = SwitchError::LaunchNotObserved {
            app: "kodi".into(),
        };
        assert_eq!(err.to_string(), "kodi was not observed running after launch");
    }
}
