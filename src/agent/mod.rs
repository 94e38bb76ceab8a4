//! The turn loop: instruction → inference → extraction → approval →
//! dispatch → memory.

pub mod context;
pub mod orchestrator;
pub mod prompt;
pub mod session;
pub mod types;

pub use context::gather_system_context;
pub use orchestrator::{InferenceSettings, Orchestrator};
pub use prompt::render_catalogue;
pub use session::{LineReader, ScriptedLines, StdinLines, run_session};
pub use types::{TurnContext, TurnOutcome, TurnState};
