use crate::actions::Proposal;
use crate::dispatch::ResultEnvelope;
use crate::error::ValidationError;
use crate::memory::MemoryEntry;
use crate::security::ApprovalDecision;
use strum::Display;

/// Immutable per-turn snapshot. Built before inference and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnContext {
    pub system_context: String,
    pub history: Vec<MemoryEntry>,
    pub auto_approve: bool,
}

/// Where a turn currently is. Used for tracing only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TurnState {
    Idle,
    AwaitingProposal,
    Extracting,
    Approving,
    Executing,
    Responding,
    RecordingMemory,
}

/// How a turn ended. Every variant is presented and recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Executed {
        proposal: Proposal,
        decision: ApprovalDecision,
        envelope: ResultEnvelope,
    },
    /// The proposal failed structural validation and never ran.
    Rejected {
        proposal: Proposal,
        error: ValidationError,
    },
    /// Confirmation was refused.
    Cancelled { proposal: Proposal },
    /// The model answered in plain text.
    Answered { text: String },
    InferenceFailed { message: String },
}

impl TurnOutcome {
    /// Memory entry for this outcome.
    pub fn to_memory_entry(&self, instruction: &str) -> MemoryEntry {
        let entry = MemoryEntry::new(instruction);
        match self {
            Self::Executed {
                proposal, envelope, ..
            } => entry.with_action(&proposal.action.family, envelope.render()),
            Self::Rejected { proposal, error } => {
                entry.with_action(&proposal.action.family, format!("rejected: {error}"))
            }
            Self::Cancelled { proposal } => {
                entry.with_action(&proposal.action.family, "cancelled by user")
            }
            Self::Answered { text } => entry.with_response(text),
            Self::InferenceFailed { message } => {
                entry.with_response(format!("(no answer: {message})"))
            }
        }
    }
}
