//! The container runtime seam.
//!
//! [`ContainerRuntime`] is the capability the driver is constructed
//! with: the handful of engine operations a task lifecycle needs,
//! expressed in the runtime client's own types. Production code uses
//! the bollard-backed [`DockerRuntime`]; tests substitute a recording
//! fake without touching process-wide state.

use std::pin::Pin;

use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, InspectContainerOptions, LogOutput, LogsOptions,
    RemoveContainerOptions, StartContainerOptions, StopContainerOptions,
};
use bollard::errors::Error;
use bollard::image::CreateImageOptions;
use bollard::models::{ContainerCreateResponse, ContainerInspectResponse, CreateImageInfo};
use bollard::Docker;
use futures::Stream;

use crate::error::DriverError;

/// Progress stream returned by an image pull.
pub type PullStream = Pin<Box<dyn Stream<Item = Result<CreateImageInfo, Error>> + Send>>;

/// Framed stdout/stderr stream returned by the log endpoint.
pub type LogStream = Pin<Box<dyn Stream<Item = Result<LogOutput, Error>> + Send>>;

/// Engine operations consumed by the driver.
///
/// Every method maps to exactly one runtime API call; the driver owns
/// sequencing and error tagging. All calls are plain await points, so
/// callers cancel or bound them by dropping the future (e.g. under
/// `tokio::time::timeout`); no deadlines are imposed here.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Requests an image pull and returns its progress stream.
    ///
    /// The runtime signals completion only once the stream is
    /// exhausted; the caller must drain it fully.
    fn create_image_stream(&self, options: CreateImageOptions<String>) -> PullStream;

    /// Creates a container and returns the runtime-assigned identity.
    async fn create_container(
        &self,
        options: CreateContainerOptions<String>,
        config: Config<String>,
    ) -> Result<ContainerCreateResponse, Error>;

    /// Starts a created container.
    async fn start_container(&self, id: &str) -> Result<(), Error>;

    /// Stops a running container.
    ///
    /// `None` options leave the grace period at the runtime default.
    async fn stop_container(&self, id: &str, options: Option<StopContainerOptions>)
        -> Result<(), Error>;

    /// Removes a stopped container.
    async fn remove_container(
        &self,
        id: &str,
        options: Option<RemoveContainerOptions>,
    ) -> Result<(), Error>;

    /// Inspects a container.
    async fn inspect_container(&self, id: &str) -> Result<ContainerInspectResponse, Error>;

    /// Opens the container's combined log stream.
    fn logs_stream(&self, id: &str, options: LogsOptions<String>) -> LogStream;
}

/// Bollard-backed runtime talking to the local Docker daemon.
#[derive(Clone)]
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connects to the local Docker daemon.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::DaemonUnavailable` if the daemon is not
    /// accessible.
    pub fn connect() -> Result<Self, DriverError> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| DriverError::DaemonUnavailable(format!("failed to connect: {e}")))?;

        Ok(Self { docker })
    }

    /// Wraps an existing bollard handle.
    pub fn from_docker(docker: Docker) -> Self {
        Self { docker }
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    fn create_image_stream(&self, options: CreateImageOptions<String>) -> PullStream {
        Box::pin(self.docker.create_image(Some(options), None, None))
    }

    async fn create_container(
        &self,
        options: CreateContainerOptions<String>,
        config: Config<String>,
    ) -> Result<ContainerCreateResponse, Error> {
        self.docker.create_container(Some(options), config).await
    }

    async fn start_container(&self, id: &str) -> Result<(), Error> {
        self.docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await
    }

    async fn stop_container(
        &self,
        id: &str,
        options: Option<StopContainerOptions>,
    ) -> Result<(), Error> {
        self.docker.stop_container(id, options).await
    }

    async fn remove_container(
        &self,
        id: &str,
        options: Option<RemoveContainerOptions>,
    ) -> Result<(), Error> {
        self.docker.remove_container(id, options).await
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerInspectResponse, Error> {
        self.docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
    }

    fn logs_stream(&self, id: &str, options: LogsOptions<String>) -> LogStream {
        Box::pin(self.docker.logs(id, Some(options)))
    }
}
