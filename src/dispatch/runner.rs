use crate::utils::text::truncate_bytes;
use async_trait::async_trait;
use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

/// Default cap on captured stdout/stderr (1 MiB).
pub const MAX_OUTPUT_BYTES: usize = 1_048_576;

const STDOUT_TRUNCATED: &str = "\n... [output truncated]";
const STDERR_TRUNCATED: &str = "\n... [stderr truncated]";

/// One external invocation: a fixed program with substituted arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub timeout: Duration,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            timeout,
        }
    }

    #[must_use]
    pub fn in_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    /// Shell-like rendering used in logs and as the lookup key of scripted runners.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// What happened to an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    Completed {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    TimedOut {
        program: String,
        after: Duration,
    },
    /// The program itself does not exist.
    NotFound {
        program: String,
    },
    SpawnFailed {
        program: String,
        message: String,
    },
}

impl CommandOutput {
    /// Completed with exit code zero.
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Completed { code: Some(0), .. })
    }

    pub fn stdout(&self) -> Option<&str> {
        match self {
            Self::Completed { stdout, .. } => Some(stdout),
            _ => None,
        }
    }

    /// A scripted successful result.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self::Completed {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A scripted non-zero exit.
    pub fn exit(code: i32, stderr: impl Into<String>) -> Self {
        Self::Completed {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Runs external programs on behalf of the dispatcher.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion, bounded by `spec.timeout`.
    async fn run(&self, spec: &CommandSpec) -> CommandOutput;

    /// Start without waiting. Reports only whether the spawn succeeded.
    async fn launch(&self, spec: &CommandSpec) -> CommandOutput;
}

/// Real runner on top of `tokio::process`.
pub struct ProcessRunner {
    max_output_bytes: usize,
}

impl ProcessRunner {
    pub const fn new(max_output_bytes: usize) -> Self {
        Self { max_output_bytes }
    }

    fn command(spec: &CommandSpec) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&spec.program);
        cmd.args(&spec.args).stdin(Stdio::null());
        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }

    fn spawn_error(spec: &CommandSpec, err: &std::io::Error) -> CommandOutput {
        // A missing working directory also surfaces as NotFound from spawn.
        if let Some(dir) = spec.cwd.as_ref().filter(|dir| !dir.is_dir()) {
            return CommandOutput::SpawnFailed {
                program: spec.program.clone(),
                message: format!("working directory {} does not exist", dir.display()),
            };
        }
        if err.kind() == ErrorKind::NotFound {
            CommandOutput::NotFound {
                program: spec.program.clone(),
            }
        } else {
            CommandOutput::SpawnFailed {
                program: spec.program.clone(),
                message: err.to_string(),
            }
        }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(MAX_OUTPUT_BYTES)
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> CommandOutput {
        tracing::debug!(command = %spec, timeout_secs = spec.timeout.as_secs(), "running command");

        let mut cmd = Self::command(spec);
        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => return Self::spawn_error(spec, &e),
        };

        // Dropping the wait future on timeout drops the child, which kills it.
        match tokio::time::timeout(spec.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => CommandOutput::Completed {
                code: output.status.code(),
                stdout: truncate_bytes(
                    String::from_utf8_lossy(&output.stdout).into_owned(),
                    self.max_output_bytes,
                    STDOUT_TRUNCATED,
                ),
                stderr: truncate_bytes(
                    String::from_utf8_lossy(&output.stderr).into_owned(),
                    self.max_output_bytes,
                    STDERR_TRUNCATED,
                ),
            },
            Ok(Err(e)) => CommandOutput::SpawnFailed {
                program: spec.program.clone(),
                message: e.to_string(),
            },
            Err(_) => {
                tracing::warn!(command = %spec, "command timed out and was killed");
                CommandOutput::TimedOut {
                    program: spec.program.clone(),
                    after: spec.timeout,
                }
            }
        }
    }

    async fn launch(&self, spec: &CommandSpec) -> CommandOutput {
        tracing::debug!(command = %spec, "launching detached command");

        let mut cmd = Self::command(spec);
        cmd.stdout(Stdio::null()).stderr(Stdio::null());

        match cmd.spawn() {
            Ok(child) => CommandOutput::Completed {
                code: Some(0),
                stdout: child
                    .id()
                    .map(|pid| format!("started {} (pid {pid})", spec.program))
                    .unwrap_or_default(),
                stderr: String::new(),
            },
            Err(e) => Self::spawn_error(spec, &e),
        }
    }
}
