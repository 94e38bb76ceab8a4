pub mod approval;

pub use approval::{
    ApprovalDecision, AutoDenyBroker, CliConfirmationBroker, Confirmation, ConfirmationBroker,
    ConfirmationRequest, DESTRUCTIVE_PATTERNS, decide, is_destructive_command, settle,
};
