use super::prompt::{system_prompt, user_message};
use super::types::{TurnContext, TurnOutcome, TurnState};
use crate::actions::{Extraction, Proposal, extract, validate};
use crate::dispatch::Dispatcher;
use crate::error::ProviderError;
use crate::memory::ConversationMemory;
use crate::providers::Provider;
use crate::security::{ConfirmationBroker, ConfirmationRequest, decide, settle};
use std::sync::Arc;
use std::time::Duration;

/// Inference parameters for every turn.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceSettings {
    pub model: String,
    pub temperature: f64,
    pub timeout: Duration,
}

/// Drives one instruction through inference, extraction, approval, dispatch
/// and memory. Turns run strictly one after another.
pub struct Orchestrator {
    provider: Arc<dyn Provider>,
    dispatcher: Dispatcher,
    broker: Arc<dyn ConfirmationBroker>,
    memory: ConversationMemory,
    inference: InferenceSettings,
    system_context: String,
    auto_approve: bool,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn Provider>,
        dispatcher: Dispatcher,
        broker: Arc<dyn ConfirmationBroker>,
        memory: ConversationMemory,
        inference: InferenceSettings,
    ) -> Self {
        Self {
            provider,
            dispatcher,
            broker,
            memory,
            inference,
            system_context: String::new(),
            auto_approve: false,
        }
    }

    #[must_use]
    pub fn with_system_context(mut self, system_context: impl Into<String>) -> Self {
        self.system_context = system_context.into();
        self
    }

    #[must_use]
    pub fn with_auto_approve(mut self, auto_approve: bool) -> Self {
        self.auto_approve = auto_approve;
        self
    }

    pub fn auto_approve(&self) -> bool {
        self.auto_approve
    }

    pub fn set_auto_approve(&mut self, auto_approve: bool) {
        self.auto_approve = auto_approve;
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn model(&self) -> &str {
        &self.inference.model
    }

    fn turn_context(&self) -> TurnContext {
        TurnContext {
            system_context: self.system_context.clone(),
            history: self.memory.context_window().to_vec(),
            auto_approve: self.auto_approve,
        }
    }

    /// Run one turn to completion. Always records to memory.
    pub async fn process_turn(&mut self, instruction: &str) -> TurnOutcome {
        let ctx = self.turn_context();
        let outcome = self.run_turn(&ctx, instruction).await;

        enter(TurnState::RecordingMemory);
        self.memory.record(outcome.to_memory_entry(instruction));
        enter(TurnState::Idle);
        outcome
    }

    async fn run_turn(&self, ctx: &TurnContext, instruction: &str) -> TurnOutcome {
        enter(TurnState::AwaitingProposal);
        let raw = match self.infer(ctx, instruction).await {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!("inference failed: {error}");
                return TurnOutcome::InferenceFailed {
                    message: error.to_string(),
                };
            }
        };

        enter(TurnState::Extracting);
        match extract(&raw) {
            Extraction::PlainText(text) => {
                enter(TurnState::Responding);
                TurnOutcome::Answered { text }
            }
            Extraction::Action(proposal) => self.handle_proposal(ctx, proposal).await,
        }
    }

    async fn infer(&self, ctx: &TurnContext, instruction: &str) -> Result<String, ProviderError> {
        let system = system_prompt(ctx);
        let message = user_message(ctx, instruction);
        let call = self.provider.chat_with_system(
            Some(system.as_str()),
            &message,
            &self.inference.model,
            self.inference.temperature,
        );

        match tokio::time::timeout(self.inference.timeout, call).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(error)) => Err(ProviderError::Request {
                provider: self.provider.name().to_string(),
                message: format!("{error:#}"),
            }),
            Err(_) => Err(ProviderError::Timeout {
                provider: self.provider.name().to_string(),
                timeout_secs: self.inference.timeout.as_secs(),
            }),
        }
    }

    /// Validate, then gate, then execute.
    async fn handle_proposal(&self, ctx: &TurnContext, proposal: Proposal) -> TurnOutcome {
        let operation = match validate(&proposal.action) {
            Ok(operation) => operation,
            Err(error) => {
                tracing::info!(action = %proposal.action.label(), "rejected proposal: {error}");
                return TurnOutcome::Rejected { proposal, error };
            }
        };

        enter(TurnState::Approving);
        let request = ConfirmationRequest {
            action: proposal.action.clone(),
            explanation: proposal.explanation.clone(),
        };
        let decision = settle(
            decide(&proposal.action, ctx.auto_approve),
            self.broker.as_ref(),
            &request,
        )
        .await;
        if !decision.permits_execution() {
            tracing::info!(action = %proposal.action.label(), "action cancelled");
            return TurnOutcome::Cancelled { proposal };
        }

        enter(TurnState::Executing);
        let envelope = self.dispatcher.execute(&operation).await;
        TurnOutcome::Executed {
            proposal,
            decision,
            envelope,
        }
    }
}

fn enter(state: TurnState) {
    tracing::debug!(state = %state, "turn state");
}
