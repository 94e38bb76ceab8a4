use super::runner::{CommandOutput, CommandRunner, CommandSpec};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Deterministic [`CommandRunner`] for unit tests.
///
/// Answers are keyed by the rendered command line (see `CommandSpec`'s
/// `Display`). Unknown command lines behave like a missing program.
#[derive(Default)]
pub struct ScriptedRunner {
    answers: HashMap<String, CommandOutput>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on(mut self, command_line: impl Into<String>, output: CommandOutput) -> Self {
        self.answers.insert(command_line.into(), output);
        self
    }

    /// Every command line seen so far, in invocation order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn answer(&self, spec: &CommandSpec) -> CommandOutput {
        let line = spec.to_string();
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.clone());
        self.answers
            .get(&line)
            .cloned()
            .unwrap_or_else(|| CommandOutput::NotFound {
                program: spec.program.clone(),
            })
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, spec: &CommandSpec) -> CommandOutput {
        self.answer(spec)
    }

    async fn launch(&self, spec: &CommandSpec) -> CommandOutput {
        self.answer(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn answers_known_lines_and_records_calls() {
        let runner = ScriptedRunner::new().on("df -h", CommandOutput::ok("/dev/sda1 50%"));
        let df = CommandSpec::new("df", ["-h"], Duration::from_secs(1));
        let lscpu = CommandSpec::new("lscpu", Vec::<String>::new(), Duration::from_secs(1));

        assert!(runner.run(&df).await.succeeded());
        assert!(matches!(
            runner.run(&lscpu).await,
            CommandOutput::NotFound { .. }
        ));
        assert_eq!(runner.calls(), ["df -h", "lscpu"]);
    }
}
