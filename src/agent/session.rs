use super::orchestrator::Orchestrator;
use crate::ui;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::{BufRead, Write};

const QUIT_WORDS: &[&str] = &["exit", "quit", "q"];

/// Source of interactive input lines.
#[async_trait]
pub trait LineReader: Send {
    /// Next line without its terminator, or `None` at end of input.
    async fn next_line(&mut self) -> anyhow::Result<Option<String>>;
}

/// Reads the process-wide stdin handle on the blocking pool, the same handle
/// the confirmation prompt uses.
pub struct StdinLines;

#[async_trait]
impl LineReader for StdinLines {
    async fn next_line(&mut self) -> anyhow::Result<Option<String>> {
        tokio::task::spawn_blocking(|| -> anyhow::Result<Option<String>> {
            let mut line = String::new();
            let read = std::io::stdin().lock().read_line(&mut line)?;
            Ok(if read == 0 {
                None
            } else {
                Some(line.trim_end_matches(['\n', '\r']).to_string())
            })
        })
        .await?
    }
}

/// Fixed input, for tests and piped scripts.
pub struct ScriptedLines(VecDeque<String>);

impl ScriptedLines {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(lines.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl LineReader for ScriptedLines {
    async fn next_line(&mut self) -> anyhow::Result<Option<String>> {
        Ok(self.0.pop_front())
    }
}

/// Interactive loop. Ends on a quit word or end of input.
pub async fn run_session(
    orchestrator: &mut Orchestrator,
    lines: &mut dyn LineReader,
    out: &mut (dyn Write + Send),
) -> anyhow::Result<()> {
    let mut out = out;
    ui::banner(&mut out, orchestrator.model(), orchestrator.auto_approve())?;

    loop {
        write!(out, "{} ", ui::style::header("You:"))?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if QUIT_WORDS.contains(&input.to_lowercase().as_str()) {
            break;
        }

        match input {
            "/yes" => {
                orchestrator.set_auto_approve(true);
                writeln!(out, "{}", ui::style::yellow("Auto-approve enabled"))?;
            }
            "/confirm" => {
                orchestrator.set_auto_approve(false);
                writeln!(out, "{}", ui::style::success("Confirmations enabled"))?;
            }
            request => {
                ui::thinking(&mut out)?;
                let outcome = orchestrator.process_turn(request).await;
                ui::render_outcome(&mut out, &outcome)?;
            }
        }
    }

    writeln!(out, "{}", ui::style::yellow("Goodbye!"))?;
    Ok(())
}
