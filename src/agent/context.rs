use crate::dispatch::{CommandOutput, CommandRunner, CommandSpec, expand_path};
use std::time::Duration;

/// Run the host description script and return its stdout.
///
/// Any failure (no script configured, missing file, non-zero exit, timeout)
/// yields an empty string.
pub async fn gather_system_context(
    runner: &dyn CommandRunner,
    script: Option<&str>,
    timeout: Duration,
) -> String {
    let Some(script) = script.map(str::trim).filter(|s| !s.is_empty()) else {
        return String::new();
    };
    let path = expand_path(script);
    let spec = CommandSpec::new("sh", [path.to_string_lossy().into_owned()], timeout);

    match runner.run(&spec).await {
        CommandOutput::Completed {
            code: Some(0),
            stdout,
            ..
        } => stdout,
        other => {
            tracing::warn!(script = %path.display(), outcome = ?other, "system context script failed");
            String::new()
        }
    }
}
