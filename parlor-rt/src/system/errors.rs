//! System-level error types.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
// (none)

/// Errors from actor system lifecycle operations.
#[derive(Debug, Error)]
pub enum SystemError {
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The system is already shutting down or stopped.
    #[error("actor system is shutting down")]
    ShuttingDown,

    /// Graceful shutdown did not finish in time.
    #[error("shutdown timed out after {timeout:?} with {remaining} actors still running")]
    ShutdownTimeout {
        /// The configured shutdown timeout.
        timeout: Duration,
        /// Actors still registered when the timeout fired.
        remaining: usize,
    },
}

/// Errors from spawning an actor.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// The system no longer accepts new actors.
    #[error("actor system is shutting down")]
    ShuttingDown,

    /// The configured actor limit is reached.
    #[error("actor limit reached ({max})")]
    LimitReached {
        /// The configured maximum.
        max: usize,
    },
}

/// Errors from [`ActorSystem::ask`](super::ActorSystem::ask).
#[derive(Debug, Error)]
pub enum AskError {
    /// The system no longer accepts the internal requester actor.
    #[error("actor system is shutting down")]
    ShuttingDown,

    /// No reply arrived within the ask timeout.
    #[error("ask received no reply within {0:?}")]
    NoReply(Duration),
}
