//! Immutable resource/image specification consumed by the driver.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ConfigError;
use crate::task::Task;

/// Restart policy names understood by the container runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
    /// No policy set; the runtime default.
    #[default]
    #[serde(rename = "")]
    Empty,
    /// Never restart.
    No,
    /// Always restart the container when it exits.
    Always,
    /// Restart unless the container was explicitly stopped.
    UnlessStopped,
    /// Restart only when the container exits non-zero.
    OnFailure,
}

impl RestartPolicy {
    /// Maps to the runtime client's policy name enum.
    pub fn to_runtime(self) -> bollard::models::RestartPolicyNameEnum {
        use bollard::models::RestartPolicyNameEnum;

        match self {
            RestartPolicy::Empty => RestartPolicyNameEnum::EMPTY,
            RestartPolicy::No => RestartPolicyNameEnum::NO,
            RestartPolicy::Always => RestartPolicyNameEnum::ALWAYS,
            RestartPolicy::UnlessStopped => RestartPolicyNameEnum::UNLESS_STOPPED,
            RestartPolicy::OnFailure => RestartPolicyNameEnum::ON_FAILURE,
        }
    }
}

impl std::fmt::Display for RestartPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RestartPolicy::Empty => write!(f, ""),
            RestartPolicy::No => write!(f, "no"),
            RestartPolicy::Always => write!(f, "always"),
            RestartPolicy::UnlessStopped => write!(f, "unless-stopped"),
            RestartPolicy::OnFailure => write!(f, "on-failure"),
        }
    }
}

impl FromStr for RestartPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(RestartPolicy::Empty),
            "no" => Ok(RestartPolicy::No),
            "always" => Ok(RestartPolicy::Always),
            "unless-stopped" => Ok(RestartPolicy::UnlessStopped),
            "on-failure" => Ok(RestartPolicy::OnFailure),
            other => Err(ConfigError::UnknownRestartPolicy(other.to_string())),
        }
    }
}

/// Configuration for a single task-to-container run.
///
/// This is the immutable input to the driver's run operation: what to
/// run and with what constraints. The driver only reads it; the owning
/// task is never touched by the driver.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Container/task display name.
    pub name: String,
    /// Image reference (registry/name:tag).
    pub image: String,
    /// CPU request in fractional cores (e.g. 0.5, 1.0, 2.0).
    pub cpu: f64,
    /// Memory request in bytes.
    pub memory: i64,
    /// Disk request in bytes.
    pub disk: i64,
    /// Ports the container listens on.
    pub exposed_ports: Vec<u16>,
    /// Environment as `KEY=VALUE` pairs, in order.
    pub env: Vec<String>,
    /// Restart policy passed to the runtime by name.
    pub restart_policy: RestartPolicy,
    /// Stream attachment requests. Advisory: log capture is always
    /// performed by the driver after start, regardless of these flags.
    pub attach_stdin: bool,
    pub attach_stdout: bool,
    pub attach_stderr: bool,
}

impl ContainerConfig {
    /// Creates a new configuration with the given name and image.
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            ..Default::default()
        }
    }

    /// Builds the configuration for re-running an existing task.
    pub fn from_task(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            image: task.image.clone(),
            cpu: task.cpu,
            memory: task.memory,
            disk: task.disk,
            exposed_ports: task.exposed_ports.clone(),
            restart_policy: task.restart_policy,
            ..Default::default()
        }
    }

    /// Sets the CPU request in fractional cores.
    pub fn with_cpu(mut self, cpu: f64) -> Self {
        self.cpu = cpu;
        self
    }

    /// Sets the memory request in bytes.
    pub fn with_memory(mut self, memory: i64) -> Self {
        self.memory = memory;
        self
    }

    /// Sets the disk request in bytes.
    pub fn with_disk(mut self, disk: i64) -> Self {
        self.disk = disk;
        self
    }

    /// Sets the ports the container listens on.
    pub fn with_exposed_ports(mut self, ports: Vec<u16>) -> Self {
        self.exposed_ports = ports;
        self
    }

    /// Sets environment variables as `KEY=VALUE` pairs.
    pub fn with_env(mut self, env: Vec<String>) -> Self {
        self.env = env;
        self
    }

    /// Sets the restart policy.
    pub fn with_restart_policy(mut self, policy: RestartPolicy) -> Self {
        self.restart_policy = policy;
        self
    }

    /// Sets the advisory stream attachment flags.
    pub fn with_attach(mut self, stdin: bool, stdout: bool, stderr: bool) -> Self {
        self.attach_stdin = stdin;
        self.attach_stdout = stdout;
        self.attach_stderr = stderr;
        self
    }

    /// Checks the configuration invariants.
    ///
    /// The driver calls this before touching the runtime, so a bad
    /// config fails fast instead of surfacing as a runtime rejection.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the image is empty or any resource
    /// request is negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image.is_empty() {
            return Err(ConfigError::EmptyImage);
        }
        if self.cpu < 0.0 {
            return Err(ConfigError::NegativeCpu(self.cpu));
        }
        if self.memory < 0 {
            return Err(ConfigError::NegativeMemory(self.memory));
        }
        if self.disk < 0 {
            return Err(ConfigError::NegativeDisk(self.disk));
        }
        Ok(())
    }

    /// Returns the CPU request in the runtime's nanocpu unit.
    ///
    /// Exactly `round(cpu * 10^9)`; no drift beyond the runtime's own
    /// rounding.
    pub fn nano_cpus(&self) -> i64 {
        (self.cpu * 1e9).round() as i64
    }

    /// Returns the exposed ports as the runtime's `"<port>/tcp"` keys.
    pub fn exposed_port_keys(&self) -> Vec<String> {
        self.exposed_ports
            .iter()
            .map(|port| format!("{}/tcp", port))
            .collect()
    }
}
