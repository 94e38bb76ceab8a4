use super::runner::CommandOutput;
use serde::ser::{Serialize, Serializer};
use std::fmt::Write;

/// Coarse outcome of an executed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitStatus {
    /// The operation ran and succeeded.
    Success,
    /// The operation ran but reported failure or ran out of time.
    Failure,
    /// The operation could not be carried out at all.
    Error,
}

/// Why a non-success envelope is not a success.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    Timeout { after_secs: u64 },
    NotFound,
    ToolMissing { program: String },
    Io,
    NonZeroExit { code: Option<i32> },
}

/// Ordered name → text pairs. Serializes as a JSON object in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(String, String)>);

impl Fields {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

/// Uniform result of any executed action.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ResultEnvelope {
    pub fields: Fields,
    pub status: ExitStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl ResultEnvelope {
    pub fn success() -> Self {
        Self {
            fields: Fields::default(),
            status: ExitStatus::Success,
            failure: None,
        }
    }

    pub fn failure(kind: FailureKind) -> Self {
        Self {
            fields: Fields::default(),
            status: ExitStatus::Failure,
            failure: Some(kind),
        }
    }

    pub fn error(kind: FailureKind) -> Self {
        Self {
            fields: Fields::default(),
            status: ExitStatus::Error,
            failure: Some(kind),
        }
    }

    /// Append a field. A repeated name replaces the earlier value in place.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.fields.0.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.0.push((name, value)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        self.status == ExitStatus::Success
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.failure, Some(FailureKind::Timeout { .. }))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.failure, Some(FailureKind::NotFound))
    }

    /// `name: value` lines for every non-blank field.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, value) in self.fields.iter() {
            if value.trim().is_empty() {
                continue;
            }
            let _ = writeln!(out, "{name}: {}", value.trim_end());
        }
        out
    }

    /// Map a finished process onto an envelope, storing stdout under `field`.
    pub fn from_command(output: CommandOutput, field: &str) -> Self {
        match output {
            CommandOutput::Completed {
                code: Some(0),
                stdout,
                stderr,
            } => Self::success()
                .with_field(field, stdout)
                .with_optional_stderr(stderr),
            CommandOutput::Completed {
                code,
                stdout,
                stderr,
            } => Self::failure(FailureKind::NonZeroExit { code })
                .with_field(field, stdout)
                .with_optional_stderr(stderr),
            other => Self::from_unfinished(other),
        }
    }

    /// Envelope for a process that never produced an exit status.
    pub fn from_unfinished(output: CommandOutput) -> Self {
        match output {
            CommandOutput::TimedOut { program, after } => {
                Self::failure(FailureKind::Timeout {
                    after_secs: after.as_secs(),
                })
                .with_field(
                    "error",
                    format!("{program} timed out after {}s and was killed", after.as_secs()),
                )
            }
            CommandOutput::NotFound { program } => Self::error(FailureKind::ToolMissing {
                program: program.clone(),
            })
            .with_field("error", format!("{program} is not installed or not on PATH")),
            CommandOutput::SpawnFailed { program, message } => Self::error(FailureKind::Io)
                .with_field("error", format!("failed to run {program}: {message}")),
            CommandOutput::Completed { code, stdout, stderr } => {
                Self::from_command(CommandOutput::Completed { code, stdout, stderr }, "output")
            }
        }
    }

    fn with_optional_stderr(self, stderr: String) -> Self {
        if stderr.trim().is_empty() {
            self
        } else {
            self.with_field("stderr", stderr)
        }
    }
}
