//! The task-to-container driver.
//!
//! Translates a [`ContainerConfig`] into the runtime lifecycle
//! sequence (pull, create, start, log attach) and a container id into
//! the teardown sequence (stop, remove), reporting every outcome as a
//! [`DriverResult`]. No panic or early unwind crosses this boundary;
//! each failure path comes back as a populated `error` field tagged by
//! the step that failed.

use std::collections::HashMap;

use bollard::container::{Config, CreateContainerOptions, LogsOptions, RemoveContainerOptions};
use bollard::image::CreateImageOptions;
use bollard::models::{HostConfig, RestartPolicy as RuntimeRestartPolicy};
use futures::StreamExt;
use tracing::{debug, error, info, warn};

use crate::error::DriverError;
use crate::execution::logs;
use crate::execution::runtime::ContainerRuntime;
use crate::task::ContainerConfig;

/// The lifecycle action a result describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverAction {
    Start,
    Stop,
}

impl std::fmt::Display for DriverAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverAction::Start => write!(f, "start"),
            DriverAction::Stop => write!(f, "stop"),
        }
    }
}

/// Outcome of a single driver action.
///
/// `container_id` is populated whenever a container exists at the time
/// the action returned, including on failure: a start that failed
/// after creation still surfaces the id so the container is never
/// silently orphaned. Callers distinguish "never created" from
/// "created but broken" by whether the id is present.
#[derive(Debug)]
pub struct DriverResult {
    pub action: DriverAction,
    pub container_id: Option<String>,
    /// Human-readable outcome; `"success"` when `error` is `None`.
    pub result: String,
    pub error: Option<DriverError>,
}

impl DriverResult {
    fn succeeded(action: DriverAction, container_id: Option<String>) -> Self {
        Self {
            action,
            container_id,
            result: "success".to_string(),
            error: None,
        }
    }

    fn failed(action: DriverAction, container_id: Option<String>, error: DriverError) -> Self {
        Self {
            action,
            container_id,
            result: String::new(),
            error: Some(error),
        }
    }

    /// Returns true if the action completed without error.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Drives one task-to-container binding through the runtime lifecycle.
///
/// Constructed with an injected [`ContainerRuntime`] capability and
/// holds no other state, so one driver may serve many tasks: each call
/// is a pure function of its input plus the live runtime. Concurrent
/// calls for different containers are safe without locking; the caller
/// must serialize actions targeting the same container. Calls block
/// until the runtime answers; bound them with `tokio::time::timeout`
/// if a hung daemon must not hang teardown.
pub struct ContainerDriver<R> {
    runtime: R,
}

impl<R: ContainerRuntime> ContainerDriver<R> {
    /// Creates a driver over the given runtime capability.
    pub fn new(runtime: R) -> Self {
        Self { runtime }
    }

    /// Pulls, creates, and starts a container for `config`, then
    /// attaches its log stream to this process's stdout/stderr.
    ///
    /// The four runtime interactions happen in strict sequence and
    /// each can fail independently:
    ///
    /// - pull failure: nothing was created, `container_id` is `None`
    /// - create failure: nothing was started, `container_id` is `None`
    /// - start failure: the created container remains, id populated
    /// - log attach failure: the container is running, id populated;
    ///   only observability is degraded
    ///
    /// Nothing is retried and no cleanup is attempted here; a caller
    /// that wants the half-created container gone issues [`stop`]
    /// with the returned id.
    ///
    /// [`stop`]: ContainerDriver::stop
    pub async fn run(&self, config: &ContainerConfig) -> DriverResult {
        if let Err(e) = config.validate() {
            warn!(name = %config.name, error = %e, "rejecting invalid container config");
            return DriverResult::failed(DriverAction::Start, None, e.into());
        }

        info!(image = %config.image, name = %config.name, "pulling image");
        let pull_options = CreateImageOptions {
            from_image: config.image.clone(),
            ..Default::default()
        };
        let mut pull = self.runtime.create_image_stream(pull_options);

        // The runtime signals pull completion only once the progress
        // stream is exhausted; stopping early risks a partial image.
        while let Some(progress) = pull.next().await {
            match progress {
                Ok(update) => {
                    if let Some(status) = update.status {
                        debug!(image = %config.image, %status, "pull progress");
                    }
                }
                Err(e) => {
                    error!(image = %config.image, error = %e, "failed to pull image");
                    return DriverResult::failed(
                        DriverAction::Start,
                        None,
                        DriverError::PullFailed {
                            image: config.image.clone(),
                            source: e,
                        },
                    );
                }
            }
        }

        let restart_policy = RuntimeRestartPolicy {
            name: Some(config.restart_policy.to_runtime()),
            maximum_retry_count: None,
        };
        let host_config = HostConfig {
            memory: Some(config.memory),
            nano_cpus: Some(config.nano_cpus()),
            restart_policy: Some(restart_policy),
            // Ephemeral host bindings for every exposed port; no fixed
            // host-port mapping is requested.
            publish_all_ports: Some(true),
            ..Default::default()
        };
        let container_config = Config {
            image: Some(config.image.clone()),
            tty: Some(false),
            env: Some(config.env.clone()),
            exposed_ports: Some(
                config
                    .exposed_port_keys()
                    .into_iter()
                    .map(|key| (key, HashMap::new()))
                    .collect(),
            ),
            attach_stdin: Some(config.attach_stdin),
            attach_stdout: Some(config.attach_stdout),
            attach_stderr: Some(config.attach_stderr),
            host_config: Some(host_config),
            ..Default::default()
        };
        let create_options = CreateContainerOptions {
            name: config.name.clone(),
            platform: None,
        };

        let id = match self
            .runtime
            .create_container(create_options, container_config)
            .await
        {
            Ok(response) => response.id,
            Err(e) => {
                error!(image = %config.image, name = %config.name, error = %e, "failed to create container");
                return DriverResult::failed(
                    DriverAction::Start,
                    None,
                    DriverError::CreateFailed {
                        name: config.name.clone(),
                        source: e,
                    },
                );
            }
        };
        info!(container_id = %id, name = %config.name, "container created");

        if let Err(e) = self.runtime.start_container(&id).await {
            error!(container_id = %id, error = %e, "failed to start container");
            return DriverResult::failed(
                DriverAction::Start,
                Some(id.clone()),
                DriverError::StartFailed { id, source: e },
            );
        }
        info!(container_id = %id, name = %config.name, "container started");

        let log_options = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            follow: false,
            timestamps: false,
            ..Default::default()
        };
        let log_stream = self.runtime.logs_stream(&id, log_options);
        let mut stdout = tokio::io::stdout();
        let mut stderr = tokio::io::stderr();
        if let Err(e) = logs::route_frames(log_stream, &mut stdout, &mut stderr).await {
            error!(container_id = %id, error = %e, "failed to attach container logs");
            return DriverResult::failed(
                DriverAction::Start,
                Some(id.clone()),
                DriverError::LogsFailed { id, source: e },
            );
        }

        DriverResult::succeeded(DriverAction::Start, Some(id))
    }

    /// Gracefully stops a container, then removes it along with its
    /// anonymous volumes.
    ///
    /// The stop uses the runtime's default grace period. Removal keeps
    /// linked containers and never forces: if the stop failed, removal
    /// is not attempted at all, so a container whose running state is
    /// unknown is never torn down blind. A stop that succeeded but
    /// failed to remove leaves the container stopped and present.
    pub async fn stop(&self, id: &str) -> DriverResult {
        info!(container_id = %id, "stopping container");
        if let Err(e) = self.runtime.stop_container(id, None).await {
            error!(container_id = %id, error = %e, "failed to stop container");
            return DriverResult::failed(
                DriverAction::Stop,
                Some(id.to_string()),
                DriverError::StopFailed {
                    id: id.to_string(),
                    source: e,
                },
            );
        }

        let remove_options = RemoveContainerOptions {
            v: true,
            link: false,
            force: false,
        };
        if let Err(e) = self.runtime.remove_container(id, Some(remove_options)).await {
            error!(container_id = %id, error = %e, "failed to remove container");
            return DriverResult::failed(
                DriverAction::Stop,
                Some(id.to_string()),
                DriverError::RemoveFailed {
                    id: id.to_string(),
                    source: e,
                },
            );
        }

        info!(container_id = %id, "container stopped and removed");
        DriverResult::succeeded(DriverAction::Stop, Some(id.to_string()))
    }

    /// Reads the host bindings the runtime allocated for a running
    /// container's published ports.
    ///
    /// Returns a map of `"<port>/<proto>"` to `"<host_ip>:<host_port>"`
    /// (the first binding per port). This is how a task's
    /// `port_bindings` field gets filled after a successful start.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::InspectFailed` if the runtime cannot
    /// inspect the container.
    pub async fn port_bindings(&self, id: &str) -> Result<HashMap<String, String>, DriverError> {
        let inspect = self
            .runtime
            .inspect_container(id)
            .await
            .map_err(|e| DriverError::InspectFailed {
                id: id.to_string(),
                source: e,
            })?;

        let mut bindings = HashMap::new();
        let ports = inspect
            .network_settings
            .and_then(|settings| settings.ports)
            .unwrap_or_default();
        for (port, hosts) in ports {
            let Some(host) = hosts.into_iter().flatten().next() else {
                continue;
            };
            bindings.insert(
                port,
                format!(
                    "{}:{}",
                    host.host_ip.unwrap_or_default(),
                    host.host_port.unwrap_or_default()
                ),
            );
        }
        Ok(bindings)
    }
}
