//! CLI command definitions for stevedore.
//!
//! The binary is the thin collaborator that owns configuration loading
//! and logging setup; everything it does with a task goes through the
//! same driver surface an orchestrator would use.

use clap::Parser;
use tracing::{info, warn};

use crate::error::DriverError;
use crate::execution::{ContainerDriver, DockerRuntime};
use crate::task::{ContainerConfig, RestartPolicy, State, Task, TaskEvent};

/// Task-to-container execution driver.
#[derive(Parser)]
#[command(name = "stevedore")]
#[command(about = "Run a task as a container, or tear one down")]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Pull an image, create a container with the task's constraints,
    /// start it and echo its logs. Prints the resulting task event as
    /// JSON.
    Run(RunArgs),

    /// Gracefully stop a container and remove it along with its
    /// anonymous volumes.
    Stop(StopArgs),
}

/// Arguments describing the task to run.
#[derive(clap::Args)]
pub struct RunArgs {
    /// Container/task display name.
    #[arg(long)]
    pub name: String,

    /// Image reference (registry/name:tag).
    #[arg(long)]
    pub image: String,

    /// CPU request in fractional cores.
    #[arg(long, default_value_t = 0.0)]
    pub cpu: f64,

    /// Memory request in bytes.
    #[arg(long, default_value_t = 0)]
    pub memory: i64,

    /// Disk request in bytes.
    #[arg(long, default_value_t = 0)]
    pub disk: i64,

    /// Port the container listens on; repeatable.
    #[arg(long = "port")]
    pub ports: Vec<u16>,

    /// Environment variable as KEY=VALUE; repeatable.
    #[arg(long = "env")]
    pub env: Vec<String>,

    /// Restart policy (no, always, unless-stopped, on-failure).
    #[arg(long)]
    pub restart_policy: Option<RestartPolicy>,
}

/// Arguments identifying the container to tear down.
#[derive(clap::Args)]
pub struct StopArgs {
    /// Runtime-assigned container identifier.
    pub container_id: String,
}

/// Parse CLI arguments and return the Cli struct.
///
/// This allows main.rs to access CLI arguments (like log_level) before
/// running commands.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with the parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => run_task_command(args).await,
        Commands::Stop(args) => stop_task_command(args).await,
    }
}

async fn run_task_command(args: RunArgs) -> anyhow::Result<()> {
    let config = ContainerConfig::new(&args.name, &args.image)
        .with_cpu(args.cpu)
        .with_memory(args.memory)
        .with_disk(args.disk)
        .with_exposed_ports(args.ports)
        .with_env(args.env)
        .with_restart_policy(args.restart_policy.unwrap_or_default());

    let mut task = Task::from_config(&config);
    task.advance(State::Scheduled)?;

    let runtime = DockerRuntime::connect()?;
    let driver = ContainerDriver::new(runtime);
    let result = driver.run(&config).await;

    task.container_id = result.container_id.clone();
    match result.error {
        None => {
            task.advance(State::Running)?;
            let id = task.container_id.as_deref().unwrap_or_default();
            match driver.port_bindings(id).await {
                Ok(bindings) => task.port_bindings = bindings,
                Err(e) => warn!(container_id = %id, error = %e, "could not read port bindings"),
            }
            info!(task_id = %task.id, container_id = %id, "task running");
            emit_event(&task)?;
            Ok(())
        }
        Some(error) => {
            task.advance(State::Failed)?;
            emit_event(&task)?;
            Err(error.into())
        }
    }
}

async fn stop_task_command(args: StopArgs) -> anyhow::Result<()> {
    let runtime = DockerRuntime::connect()?;
    let driver = ContainerDriver::new(runtime);

    let result = driver.stop(&args.container_id).await;
    match result.error {
        None => {
            info!(container_id = %args.container_id, "task stopped");
            Ok(())
        }
        Some(error @ DriverError::RemoveFailed { .. }) => {
            // Stopped but still present; the caller must not assume
            // cleanup completed.
            warn!(container_id = %args.container_id, "container stopped but not removed");
            Err(error.into())
        }
        Some(error) => Err(error.into()),
    }
}

fn emit_event(task: &Task) -> anyhow::Result<()> {
    let event = TaskEvent::new(task);
    println!("{}", serde_json::to_string_pretty(&event)?);
    Ok(())
}
