//! Execution layer: turns a validated [`Operation`] into external
//! invocations and normalizes whatever happens into a [`ResultEnvelope`].
//!
//! Nothing in here returns an error. Missing tools, missing files, non-zero
//! exits and timeouts all become envelope states.

mod cluster;
mod desktop;
pub mod envelope;
mod files;
mod network;
mod resources;
pub mod runner;
#[cfg(test)]
mod scripted;
mod services;
mod shell;

pub use cluster::partially_ready_rows;
pub use envelope::{ExitStatus, FailureKind, Fields, ResultEnvelope};
pub use files::expand_path;
pub use runner::{CommandOutput, CommandRunner, CommandSpec, MAX_OUTPUT_BYTES, ProcessRunner};
#[cfg(test)]
pub(crate) use scripted::ScriptedRunner;

use crate::actions::Operation;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Timeouts and well-known config locations used by the family handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    pub command_timeout: Duration,
    /// Applies to journal and pod log retrieval.
    pub log_timeout: Duration,
    pub compositor_config: PathBuf,
    /// Tried in order; the first existing file wins.
    pub status_bar_configs: Vec<PathBuf>,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(30),
            log_timeout: Duration::from_secs(60),
            compositor_config: expand_path("~/.config/sway/config"),
            status_bar_configs: vec![
                expand_path("~/.config/waybar/config.jsonc"),
                expand_path("~/.config/waybar/config"),
            ],
        }
    }
}

pub struct Dispatcher {
    runner: Arc<dyn CommandRunner>,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(runner: Arc<dyn CommandRunner>, settings: DispatchSettings) -> Self {
        Self { runner, settings }
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    pub async fn execute(&self, operation: &Operation) -> ResultEnvelope {
        let family = operation.family();
        tracing::info!(family = %family, "dispatching operation");

        let envelope = match operation {
            Operation::RunCommand {
                command,
                working_dir,
            } => self.run_shell(command, working_dir.as_deref()).await,
            Operation::ReadPath { path } => files::read_path(&expand_path(path)).await,
            Operation::WritePath { path, content } => {
                files::write_path(&expand_path(path), content).await
            }
            Operation::Compositor(op) => self.compositor(op).await,
            Operation::StatusBar(op) => self.status_bar(op).await,
            Operation::Network(op) => self.network(op).await,
            Operation::Service(op) => self.service(op).await,
            Operation::Cluster(op) => self.cluster(op).await,
            Operation::Resource(component) => self.resource_status(*component).await,
        };

        tracing::debug!(family = %family, status = ?envelope.status, "operation finished");
        envelope
    }

    fn command<I, S>(&self, program: &str, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::new(program, args, self.settings.command_timeout)
    }

    fn log_command<I, S>(&self, program: &str, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::new(program, args, self.settings.log_timeout)
    }

    /// Run and map onto an envelope with stdout under `output`.
    async fn run_to_envelope(&self, spec: &CommandSpec) -> ResultEnvelope {
        ResultEnvelope::from_command(self.runner.run(spec).await, "output")
    }
}
