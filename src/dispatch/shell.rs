use super::envelope::{FailureKind, ResultEnvelope};
use super::files::expand_path;
use super::runner::CommandOutput;
use super::Dispatcher;

impl Dispatcher {
    /// `sh -c <command>`, optionally inside `working_dir`.
    pub(super) async fn run_shell(&self, command: &str, working_dir: Option<&str>) -> ResultEnvelope {
        let mut spec = self.command("sh", ["-c", command]);
        if let Some(dir) = working_dir.filter(|d| !d.trim().is_empty()) {
            spec = spec.in_dir(expand_path(dir));
        }

        match self.runner.run(&spec).await {
            CommandOutput::Completed {
                code,
                stdout,
                stderr,
            } => {
                let envelope = if code == Some(0) {
                    ResultEnvelope::success()
                } else {
                    ResultEnvelope::failure(FailureKind::NonZeroExit { code })
                };
                envelope
                    .with_field("stdout", stdout)
                    .with_field("stderr", stderr)
                    .with_field(
                        "returncode",
                        code.map_or_else(|| "killed by signal".to_string(), |c| c.to_string()),
                    )
            }
            other => ResultEnvelope::from_unfinished(other),
        }
    }
}
