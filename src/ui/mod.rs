//! Terminal presentation of turn outcomes.

pub mod style;

use crate::agent::TurnOutcome;
use crate::dispatch::{ExitStatus, ResultEnvelope};
use crate::security::ApprovalDecision;
use std::io::{self, Write};

pub fn banner(out: &mut impl Write, model: &str, auto_approve: bool) -> io::Result<()> {
    writeln!(out, "{}", style::success("sysops agent"))?;
    writeln!(out, "{}", style::blue(format!("Model: {model}")))?;
    if auto_approve {
        writeln!(out, "{}", style::yellow("Auto-approve is ON: no confirmations"))?;
    }
    writeln!(
        out,
        "{}\n",
        style::dim("Type 'exit' to quit, '/yes' to auto-approve, '/confirm' to ask again")
    )
}

pub fn thinking(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\n{}", style::dim("Thinking..."))
}

/// Every non-blank field, name on its own line followed by the value.
pub fn render_envelope(out: &mut impl Write, envelope: &ResultEnvelope) -> io::Result<()> {
    for (name, value) in envelope.fields.iter() {
        if value.trim().is_empty() {
            continue;
        }
        writeln!(out, "\n{}", style::header(format!("{name}:")))?;
        writeln!(out, "{}", value.trim_end())?;
    }
    Ok(())
}

pub fn render_outcome(out: &mut impl Write, outcome: &TurnOutcome) -> io::Result<()> {
    match outcome {
        TurnOutcome::Executed {
            proposal,
            decision,
            envelope,
        } => {
            if *decision == ApprovalDecision::AutoApproved {
                let what = proposal
                    .explanation
                    .clone()
                    .unwrap_or_else(|| proposal.action.label());
                writeln!(out, "{} {what}", style::success("✓ Auto-approved:"))?;
            }
            let title = match envelope.status {
                ExitStatus::Success => style::success("✓ Result:"),
                ExitStatus::Failure => style::failure("✗ Failed:"),
                ExitStatus::Error => style::failure("✗ Error:"),
            };
            writeln!(out, "\n{title}")?;
            render_envelope(out, envelope)
        }
        TurnOutcome::Rejected { proposal, error } => writeln!(
            out,
            "{} {}: {error}",
            style::failure("✗ Invalid action"),
            proposal.action.label()
        ),
        TurnOutcome::Cancelled { .. } => writeln!(out, "{}", style::failure("✗ Action cancelled")),
        TurnOutcome::Answered { text } => {
            writeln!(out, "\n{}", style::blue("Response:"))?;
            writeln!(out, "{text}")
        }
        TurnOutcome::InferenceFailed { message } => writeln!(
            out,
            "{} {message}",
            style::failure("✗ Inference failed:")
        ),
    }
}
