//! Command-line interface for stevedore.
//!
//! Provides the `run` and `stop` commands plus the logging/config
//! bootstrap owned by the binary.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli, Commands, RunArgs, StopArgs};
