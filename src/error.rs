//! Error types for stevedore operations.
//!
//! Defines error types for the two subsystems:
//! - Task lifecycle and state transitions
//! - Container driver operations against the runtime
//!
//! Driver failures are tagged by the lifecycle step that failed, so a
//! caller can tell "container never started" from "container started,
//! observability degraded" without parsing log text.

use thiserror::Error;

use crate::task::State;

/// Errors raised when validating a container configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("image must not be empty")]
    EmptyImage,

    #[error("cpu request must be non-negative, got {0}")]
    NegativeCpu(f64),

    #[error("memory request must be non-negative, got {0}")]
    NegativeMemory(i64),

    #[error("disk request must be non-negative, got {0}")]
    NegativeDisk(i64),

    #[error("unknown restart policy '{0}'")]
    UnknownRestartPolicy(String),
}

/// Errors raised while maintaining a task's lifecycle state.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("invalid state transition from '{from}' to '{to}'")]
    InvalidTransition { from: State, to: State },
}

/// Errors that can occur during container driver operations.
///
/// Each variant corresponds to exactly one runtime interaction, in the
/// order the driver performs them. `StartFailed` and `LogsFailed` leave
/// a container behind; the driver surfaces its id alongside the error.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("container runtime not available: {0}")]
    DaemonUnavailable(String),

    #[error("invalid container config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("failed to pull image '{image}': {source}")]
    PullFailed {
        image: String,
        #[source]
        source: bollard::errors::Error,
    },

    #[error("failed to create container '{name}': {source}")]
    CreateFailed {
        name: String,
        #[source]
        source: bollard::errors::Error,
    },

    #[error("failed to start container '{id}': {source}")]
    StartFailed {
        id: String,
        #[source]
        source: bollard::errors::Error,
    },

    #[error("failed to attach logs for container '{id}': {source}")]
    LogsFailed {
        id: String,
        #[source]
        source: bollard::errors::Error,
    },

    #[error("failed to stop container '{id}': {source}")]
    StopFailed {
        id: String,
        #[source]
        source: bollard::errors::Error,
    },

    #[error("failed to remove container '{id}': {source}")]
    RemoveFailed {
        id: String,
        #[source]
        source: bollard::errors::Error,
    },

    #[error("failed to inspect container '{id}': {source}")]
    InspectFailed {
        id: String,
        #[source]
        source: bollard::errors::Error,
    },
}
