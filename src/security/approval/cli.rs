use super::{Confirmation, ConfirmationBroker, ConfirmationRequest};
use anyhow::Result;
use async_trait::async_trait;
use console::style;
use std::io::{BufRead, Write};

/// Line-oriented confirmation on the controlling terminal.
///
/// Prompts on stderr and reads answers from the process-wide stdin handle,
/// the same one the interactive session reads from. Waits indefinitely.
pub struct CliConfirmationBroker;

impl CliConfirmationBroker {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ConfirmationBroker for CliConfirmationBroker {
    async fn confirm(&self, request: &ConfirmationRequest) -> Result<Confirmation> {
        let request = request.clone();
        tokio::task::spawn_blocking(move || {
            let stdin = std::io::stdin();
            let mut input = stdin.lock();
            let mut output = std::io::stderr();
            prompt_for_confirmation(&request, &mut input, &mut output)
        })
        .await?
    }
}

/// `[y/N/show]` exchange. `show` prints the full action and asks once more.
/// Anything but `y`/`yes`, including end of input, declines.
pub fn prompt_for_confirmation(
    request: &ConfirmationRequest,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<Confirmation> {
    writeln!(output)?;
    writeln!(output, "{}", style("LLM wants to:").yellow().for_stderr())?;
    writeln!(
        output,
        "{}",
        style(request.explanation.as_deref().unwrap_or("Run an action"))
            .bold()
            .for_stderr()
    )?;
    writeln!(output)?;
    writeln!(output, "{} {}", style("Action:").blue().for_stderr(), request.action.label())?;
    writeln!(output, "{}", style("Arguments:").blue().for_stderr())?;
    for (name, value) in &request.action.arguments {
        writeln!(output, "  {name}: {value}")?;
    }

    write!(
        output,
        "\n{} ",
        style("Allow this action? [y/N/show]:").yellow().for_stderr()
    )?;
    output.flush()?;
    let mut answer = read_answer(input)?;

    if answer == "show" {
        writeln!(output, "\n{}", style("Full action:").blue().for_stderr())?;
        writeln!(output, "{}", serde_json::to_string_pretty(request)?)?;
        write!(output, "\n{} ", style("Allow? [y/N]:").yellow().for_stderr())?;
        output.flush()?;
        answer = read_answer(input)?;
    }

    Ok(if is_affirmative(&answer) {
        Confirmation::Approved
    } else {
        Confirmation::Declined
    })
}

fn read_answer(input: &mut impl BufRead) -> Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_lowercase())
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer, "y" | "yes")
}
