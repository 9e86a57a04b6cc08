//! Container execution layer.
//!
//! This module drives one task-to-container binding through the
//! runtime lifecycle using the bollard crate, behind an injected
//! [`ContainerRuntime`] capability.
//!
//! # Architecture
//!
//! A run action performs, in strict sequence:
//!
//! ```text
//! pull image → create container → start → attach logs
//! ```
//!
//! and a stop action:
//!
//! ```text
//! stop (default grace period) → remove (with anonymous volumes)
//! ```
//!
//! Every step can fail independently; the outcome always comes back as
//! a [`DriverResult`] with the failed step tagged in its error.
//!
//! # Example
//!
//! ```ignore
//! use stevedore::execution::{ContainerDriver, DockerRuntime};
//! use stevedore::task::ContainerConfig;
//!
//! let runtime = DockerRuntime::connect()?;
//! let driver = ContainerDriver::new(runtime);
//!
//! let config = ContainerConfig::new("t1", "redis:alpine").with_cpu(0.5);
//! let result = driver.run(&config).await;
//! if let Some(id) = &result.container_id {
//!     driver.stop(id).await;
//! }
//! ```

pub mod driver;
pub mod logs;
pub mod runtime;

pub use driver::{ContainerDriver, DriverAction, DriverResult};
pub use runtime::{ContainerRuntime, DockerRuntime, LogStream, PullStream};
