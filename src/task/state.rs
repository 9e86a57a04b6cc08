//! Task lifecycle states and the legal transitions between them.
//!
//! States move in one direction only:
//!
//! ```text
//! Pending → Scheduled → Running → {Completed | Failed}
//! ```
//!
//! `Failed` is reachable from any non-terminal state; `Completed` only
//! from `Running` via an explicit, successful stop.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    /// Task has been created but not yet assigned to a worker.
    Pending,
    /// Task has been assigned to a worker.
    Scheduled,
    /// Task's container is running.
    Running,
    /// Task's container was stopped gracefully.
    Completed,
    /// A lifecycle step reported an error.
    Failed,
}

impl State {
    /// Returns true if `next` is a legal transition from this state.
    ///
    /// Transitions are monotonic. `Scheduled` and `Running` may
    /// re-observe themselves; the terminal states accept nothing.
    pub fn can_transition_to(self, next: State) -> bool {
        use State::*;

        matches!(
            (self, next),
            (Pending, Scheduled)
                | (Pending, Failed)
                | (Scheduled, Scheduled)
                | (Scheduled, Running)
                | (Scheduled, Failed)
                | (Running, Running)
                | (Running, Completed)
                | (Running, Failed)
        )
    }

    /// Returns true if the state is terminal (completed or failed).
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Completed | State::Failed)
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            State::Pending => write!(f, "pending"),
            State::Scheduled => write!(f, "scheduled"),
            State::Running => write!(f, "running"),
            State::Completed => write!(f, "completed"),
            State::Failed => write!(f, "failed"),
        }
    }
}
