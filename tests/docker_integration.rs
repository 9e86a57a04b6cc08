//! Integration tests for the container driver.
//!
//! These tests talk to a real Docker daemon.
//! Run with: cargo test --test docker_integration -- --ignored

use bollard::container::{Config, CreateContainerOptions, RemoveContainerOptions};
use bollard::Docker;
use uuid::Uuid;

use stevedore::error::DriverError;
use stevedore::execution::{ContainerDriver, DockerRuntime, DriverAction};
use stevedore::task::ContainerConfig;

fn test_driver() -> ContainerDriver<DockerRuntime> {
    let runtime = DockerRuntime::connect().expect("Docker daemon must be reachable");
    ContainerDriver::new(runtime)
}

fn unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore] // Run with: cargo test --test docker_integration -- --ignored
async fn test_run_and_stop_redis() {
    let driver = test_driver();
    let config = ContainerConfig::new(unique_name("t1"), "redis:alpine")
        .with_cpu(0.5)
        .with_memory(67108864)
        .with_exposed_ports(vec![6379]);

    let result = driver.run(&config).await;
    assert!(result.error.is_none(), "run failed: {:?}", result.error);
    assert_eq!(result.action, DriverAction::Start);
    assert_eq!(result.result, "success");

    let id = result.container_id.expect("container id must be set");
    assert!(!id.is_empty());

    // The runtime must report the container as running.
    let docker = Docker::connect_with_local_defaults().unwrap();
    let inspect = docker.inspect_container(&id, None).await.unwrap();
    assert_eq!(inspect.state.and_then(|s| s.running), Some(true));

    // All exposed ports were published to ephemeral host ports.
    let bindings = driver.port_bindings(&id).await.unwrap();
    assert!(bindings.contains_key("6379/tcp"), "bindings: {bindings:?}");

    let stopped = driver.stop(&id).await;
    assert!(stopped.error.is_none(), "stop failed: {:?}", stopped.error);
    assert_eq!(stopped.action, DriverAction::Stop);
    assert_eq!(stopped.result, "success");
}

#[tokio::test]
#[ignore]
async fn test_run_unresolvable_image() {
    let driver = test_driver();
    let name = unique_name("t-missing");
    let config = ContainerConfig::new(&name, "does-not-exist:latest");

    let result = driver.run(&config).await;

    assert!(matches!(result.error, Some(DriverError::PullFailed { .. })));
    assert!(result.container_id.is_none());

    // No container was created under the task's name.
    let docker = Docker::connect_with_local_defaults().unwrap();
    assert!(docker.inspect_container(&name, None).await.is_err());
}

#[tokio::test]
#[ignore]
async fn test_stop_twice_on_removed_container() {
    let driver = test_driver();
    let config = ContainerConfig::new(unique_name("t-twice"), "redis:alpine");

    let result = driver.run(&config).await;
    let id = result.container_id.expect("container id must be set");

    assert!(driver.stop(&id).await.error.is_none());

    // Second stop on the removed id fails deterministically.
    let second = driver.stop(&id).await;
    assert!(matches!(second.error, Some(DriverError::StopFailed { .. })));
}

#[tokio::test]
#[ignore]
async fn test_stop_created_but_never_started_container() {
    let docker = Docker::connect_with_local_defaults().unwrap();
    let name = unique_name("t-created");

    // Create directly, bypassing start.
    let created = docker
        .create_container(
            Some(CreateContainerOptions {
                name: name.clone(),
                platform: None,
            }),
            Config::<String> {
                image: Some("redis:alpine".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("image must be present locally; run the redis test first");

    let driver = test_driver();
    let result = driver.stop(&created.id).await;

    // The runtime cannot stop a container that never ran; the
    // container must remain present after the failed stop.
    assert!(matches!(result.error, Some(DriverError::StopFailed { .. })));
    assert!(docker.inspect_container(&created.id, None).await.is_ok());

    docker
        .remove_container(
            &created.id,
            Some(RemoveContainerOptions {
                force: true,
                ..Default::default()
            }),
        )
        .await
        .unwrap();
}
