#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unnecessary_literal_bound,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod actions;
pub mod agent;
pub mod app;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod mcp;
pub mod memory;
pub mod providers;
pub mod security;
pub mod ui;
pub mod utils;

pub use actions::{Action, Extraction, Operation, Proposal, extract, validate};
pub use agent::{Orchestrator, TurnOutcome};
pub use config::Config;
pub use dispatch::{Dispatcher, ExitStatus, ResultEnvelope};
pub use error::{Result, SysopsError};
