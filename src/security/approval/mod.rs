pub mod cli;

pub use cli::{CliConfirmationBroker, prompt_for_confirmation};

use crate::actions::{Action, Family};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Substrings that mark a `run_command` as destructive.
///
/// This is a heuristic, not a security boundary: pipes, aliases, scripts and
/// other indirection slip past it.
pub const DESTRUCTIVE_PATTERNS: &[&str] = &[
    "rm ", "rmdir", "rm -", "unlink", "shred", "dd ", "mkfs", "fdisk", "parted",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    /// Runs unattended.
    AutoApproved,
    /// Must not run until the operator says yes.
    RequiresConfirmation,
    /// The operator said yes.
    Confirmed,
    /// Must not run.
    Denied,
}

impl ApprovalDecision {
    pub fn permits_execution(self) -> bool {
        matches!(self, Self::AutoApproved | Self::Confirmed)
    }
}

/// Gate policy, evaluated in order:
/// operator override, file writes, destructive shell commands, everything else.
pub fn decide(action: &Action, auto_approve: bool) -> ApprovalDecision {
    if auto_approve {
        return ApprovalDecision::AutoApproved;
    }

    match action.family.parse::<Family>() {
        Ok(Family::WritePath) => ApprovalDecision::RequiresConfirmation,
        Ok(Family::RunCommand)
            if action
                .argument("command")
                .is_some_and(is_destructive_command) =>
        {
            ApprovalDecision::RequiresConfirmation
        }
        _ => ApprovalDecision::AutoApproved,
    }
}

pub fn is_destructive_command(command: &str) -> bool {
    DESTRUCTIVE_PATTERNS
        .iter()
        .any(|pattern| command.contains(pattern))
}

/// What the operator is asked to approve.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmationRequest {
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Approved,
    Declined,
}

/// Interactive consent for actions that require confirmation.
#[async_trait]
pub trait ConfirmationBroker: Send + Sync {
    async fn confirm(&self, request: &ConfirmationRequest) -> anyhow::Result<Confirmation>;
}

/// Broker for surfaces with no operator attached. Declines everything.
pub struct AutoDenyBroker {
    pub reason: String,
}

#[async_trait]
impl ConfirmationBroker for AutoDenyBroker {
    async fn confirm(&self, request: &ConfirmationRequest) -> anyhow::Result<Confirmation> {
        tracing::info!(
            action = %request.action.label(),
            reason = self.reason.as_str(),
            "confirmation declined automatically"
        );
        Ok(Confirmation::Declined)
    }
}

/// Turn a gate decision into a final one, asking the broker when needed.
/// Broker failures count as a denial.
pub async fn settle(
    decision: ApprovalDecision,
    broker: &dyn ConfirmationBroker,
    request: &ConfirmationRequest,
) -> ApprovalDecision {
    if decision != ApprovalDecision::RequiresConfirmation {
        return decision;
    }
    match broker.confirm(request).await {
        Ok(Confirmation::Approved) => ApprovalDecision::Confirmed,
        Ok(Confirmation::Declined) => ApprovalDecision::Denied,
        Err(error) => {
            tracing::warn!("confirmation prompt failed: {error}");
            ApprovalDecision::Denied
        }
    }
}
