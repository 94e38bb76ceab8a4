use super::envelope::{FailureKind, ResultEnvelope};
use super::files::{not_found, read_text};
use super::runner::CommandOutput;
use super::Dispatcher;
use crate::actions::{CompositorOp, StatusBarOp};
use tokio::io::AsyncWriteExt;

/// Config lines that start with `bindsym`, trimmed.
pub(super) fn binding_lines(config: &str) -> Vec<&str> {
    config
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("bindsym"))
        .collect()
}

impl Dispatcher {
    pub(super) async fn compositor(&self, op: &CompositorOp) -> ResultEnvelope {
        let config = &self.settings.compositor_config;
        match op {
            CompositorOp::Show => match read_text(config).await {
                Ok(content) => ResultEnvelope::success().with_field("content", content),
                Err(envelope) => envelope,
            },
            CompositorOp::ListBindings => match read_text(config).await {
                Ok(content) => ResultEnvelope::success()
                    .with_field("bindings", binding_lines(&content).join("\n")),
                Err(envelope) => envelope,
            },
            CompositorOp::AddBinding { key, command } => {
                let line = format!("bindsym {key} exec {command}");
                let appended = async {
                    let mut file = tokio::fs::OpenOptions::new()
                        .create(true)
                        .append(true)
                        .open(config)
                        .await?;
                    file.write_all(format!("{line}\n").as_bytes()).await?;
                    file.flush().await
                }
                .await;
                match appended {
                    Ok(()) => ResultEnvelope::success()
                        .with_field("status", "success")
                        .with_field("added", line),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => not_found(config),
                    Err(e) => ResultEnvelope::error(FailureKind::Io)
                        .with_field("error", format!("{}: {e}", config.display())),
                }
            }
            CompositorOp::Reload => {
                self.run_to_envelope(&self.command("swaymsg", ["reload"]))
                    .await
            }
        }
    }

    pub(super) async fn status_bar(&self, op: &StatusBarOp) -> ResultEnvelope {
        match op {
            StatusBarOp::Show => {
                for path in &self.settings.status_bar_configs {
                    match read_text(path).await {
                        Ok(content) => {
                            return ResultEnvelope::success()
                                .with_field("path", path.display().to_string())
                                .with_field("content", content);
                        }
                        Err(envelope) if envelope.is_not_found() => {}
                        Err(envelope) => return envelope,
                    }
                }
                ResultEnvelope::error(FailureKind::NotFound)
                    .with_field("error", "status bar config not found")
            }
            StatusBarOp::Restart => {
                // Exit status is ignored: there may be no running instance.
                let _ = self.runner.run(&self.command("killall", ["waybar"])).await;
                match self
                    .runner
                    .launch(&self.command("waybar", Vec::<String>::new()))
                    .await
                {
                    CommandOutput::Completed { .. } => ResultEnvelope::success()
                        .with_field("status", "success")
                        .with_field("message", "status bar restarted"),
                    other => ResultEnvelope::from_unfinished(other),
                }
            }
            StatusBarOp::Reload => {
                let envelope = self
                    .run_to_envelope(&self.command("killall", ["-SIGUSR2", "waybar"]))
                    .await;
                if envelope.is_success() {
                    envelope.with_field("message", "status bar reloaded")
                } else {
                    envelope
                }
            }
        }
    }
}
