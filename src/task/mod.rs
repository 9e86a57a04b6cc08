//! Orchestrator-visible unit of work bound to a container.
//!
//! A [`Task`] carries identity, the desired resource/image spec and the
//! current lifecycle [`State`]. The driver never mutates a task; the
//! orchestrator applies driver results and records each change as an
//! immutable [`TaskEvent`].

pub mod config;
pub mod state;

pub use config::{ContainerConfig, RestartPolicy};
pub use state::State;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::TaskError;

/// A unit of work bound to at most one container.
///
/// Owned exclusively by the orchestrator. `container_id` stays empty
/// until a start succeeds; `port_bindings` is populated only after a
/// successful start, from the runtime's ephemeral host allocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub container_id: Option<String>,
    pub name: String,
    pub state: State,
    pub image: String,
    pub cpu: f64,
    pub memory: i64,
    pub disk: i64,
    pub exposed_ports: Vec<u16>,
    pub port_bindings: HashMap<String, String>,
    pub restart_policy: RestartPolicy,
    pub start_time: Option<DateTime<Utc>>,
    pub finish_time: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new pending task with a fresh v4 UUID.
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            container_id: None,
            name: name.into(),
            state: State::Pending,
            image: image.into(),
            cpu: 0.0,
            memory: 0,
            disk: 0,
            exposed_ports: Vec::new(),
            port_bindings: HashMap::new(),
            restart_policy: RestartPolicy::default(),
            start_time: None,
            finish_time: None,
        }
    }

    /// Creates a new pending task mirroring a container configuration.
    pub fn from_config(config: &ContainerConfig) -> Self {
        Self {
            cpu: config.cpu,
            memory: config.memory,
            disk: config.disk,
            exposed_ports: config.exposed_ports.clone(),
            restart_policy: config.restart_policy,
            ..Self::new(config.name.clone(), config.image.clone())
        }
    }

    /// Moves the task to `next`, stamping timestamps along the way.
    ///
    /// Entering `Running` records `start_time`; entering a terminal
    /// state records `finish_time`.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::InvalidTransition` if the move is not legal
    /// for the current state.
    pub fn advance(&mut self, next: State) -> Result<(), TaskError> {
        if !self.state.can_transition_to(next) {
            return Err(TaskError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        if next == State::Running && self.start_time.is_none() {
            self.start_time = Some(Utc::now());
        }
        if next.is_terminal() {
            self.finish_time = Some(Utc::now());
        }

        self.state = next;
        Ok(())
    }
}

/// An immutable, timestamped snapshot of a task's state change.
///
/// Append-only from the orchestrator's perspective; never mutated
/// after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEvent {
    pub id: Uuid,
    pub state: State,
    pub timestamp: DateTime<Utc>,
    pub task: Task,
}

impl TaskEvent {
    /// Records the task as it is right now.
    pub fn new(task: &Task) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: task.state,
            timestamp: Utc::now(),
            task: task.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_is_pending() {
        let task = Task::new("t1", "redis:alpine");
        assert_eq!(task.state, State::Pending);
        assert!(task.container_id.is_none());
        assert!(task.start_time.is_none());
        assert!(task.finish_time.is_none());
        assert!(task.port_bindings.is_empty());
    }

    #[test]
    fn test_from_config_mirrors_resources() {
        let config = ContainerConfig::new("t1", "redis:alpine")
            .with_cpu(0.5)
            .with_memory(67108864)
            .with_exposed_ports(vec![6379])
            .with_restart_policy(RestartPolicy::OnFailure);

        let task = Task::from_config(&config);
        assert_eq!(task.name, "t1");
        assert_eq!(task.image, "redis:alpine");
        assert_eq!(task.cpu, 0.5);
        assert_eq!(task.memory, 67108864);
        assert_eq!(task.exposed_ports, vec![6379]);
        assert_eq!(task.restart_policy, RestartPolicy::OnFailure);
        assert_eq!(task.state, State::Pending);
    }

    #[test]
    fn test_config_from_task_round_trip() {
        let task = Task::from_config(
            &ContainerConfig::new("t1", "redis:alpine")
                .with_cpu(1.5)
                .with_memory(1024),
        );
        let config = ContainerConfig::from_task(&task);
        assert_eq!(config.name, "t1");
        assert_eq!(config.image, "redis:alpine");
        assert_eq!(config.cpu, 1.5);
        assert_eq!(config.memory, 1024);
    }

    #[test]
    fn test_advance_stamps_timestamps() {
        let mut task = Task::new("t1", "redis:alpine");
        task.advance(State::Scheduled).unwrap();
        assert!(task.start_time.is_none());

        task.advance(State::Running).unwrap();
        assert!(task.start_time.is_some());
        assert!(task.finish_time.is_none());

        task.advance(State::Completed).unwrap();
        assert!(task.finish_time.is_some());
    }

    #[test]
    fn test_advance_rejects_illegal_transition() {
        let mut task = Task::new("t1", "redis:alpine");
        let err = task.advance(State::Completed).unwrap_err();
        assert!(matches!(
            err,
            TaskError::InvalidTransition {
                from: State::Pending,
                to: State::Completed,
            }
        ));
        assert_eq!(task.state, State::Pending);
    }

    #[test]
    fn test_advance_to_failed_from_pending() {
        let mut task = Task::new("t1", "redis:alpine");
        task.advance(State::Failed).unwrap();
        assert_eq!(task.state, State::Failed);
        assert!(task.finish_time.is_some());
    }

    #[test]
    fn test_event_snapshots_task() {
        let mut task = Task::new("t1", "redis:alpine");
        task.advance(State::Scheduled).unwrap();

        let event = TaskEvent::new(&task);
        assert_eq!(event.state, State::Scheduled);
        assert_eq!(event.task.id, task.id);

        // Later task changes must not leak into the snapshot.
        task.advance(State::Failed).unwrap();
        assert_eq!(event.task.state, State::Scheduled);
    }

    #[test]
    fn test_task_serializes() {
        let task = Task::new("t1", "redis:alpine");
        let json = serde_json::to_string(&task).unwrap();
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, task.id);
        assert_eq!(back.state, State::Pending);
    }
}
