//! Bounded conversation memory.
//!
//! The ledger is append-only. Only the newest `window` entries are replayed
//! into the next prompt, and tool results are cut down before they are
//! stored.

use crate::utils::text::truncate_with_marker;
use serde::Serialize;
use std::fmt::Write;

pub const DEFAULT_WINDOW: usize = 3;
pub const DEFAULT_SUMMARY_CHARS: usize = 500;
pub const TRUNCATION_MARKER: &str = "... [truncated]";

/// One completed turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryEntry {
    pub instruction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_text: Option<String>,
}

impl MemoryEntry {
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            action_family: None,
            result_summary: None,
            response_text: None,
        }
    }

    #[must_use]
    pub fn with_action(mut self, family: impl Into<String>, result: impl Into<String>) -> Self {
        self.action_family = Some(family.into());
        self.result_summary = Some(result.into());
        self
    }

    #[must_use]
    pub fn with_response(mut self, text: impl Into<String>) -> Self {
        self.response_text = Some(text.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct ConversationMemory {
    entries: Vec<MemoryEntry>,
    window: usize,
    summary_chars: usize,
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, DEFAULT_SUMMARY_CHARS)
    }
}

impl ConversationMemory {
    pub fn new(window: usize, summary_chars: usize) -> Self {
        Self {
            entries: Vec::new(),
            window,
            summary_chars,
        }
    }

    /// Append an entry, truncating its result summary first.
    pub fn record(&mut self, mut entry: MemoryEntry) {
        if let Some(summary) = entry.result_summary.take() {
            entry.result_summary = Some(truncate_with_marker(
                &summary,
                self.summary_chars,
                TRUNCATION_MARKER,
            ));
        }
        tracing::debug!(
            instruction = %entry.instruction,
            family = entry.action_family.as_deref().unwrap_or("-"),
            "recorded memory entry"
        );
        self.entries.push(entry);
    }

    /// The newest `window` entries, oldest first.
    pub fn context_window(&self) -> &[MemoryEntry] {
        let start = self.entries.len().saturating_sub(self.window);
        &self.entries[start..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prompt block for the replayed window. Empty when there is no history.
    pub fn render_context(&self) -> String {
        render_entries(self.context_window())
    }
}

/// "Previous conversation" block for a window snapshot.
pub fn render_entries(window: &[MemoryEntry]) -> String {
    if window.is_empty() {
        return String::new();
    }
    let mut out = String::from("Previous conversation:\n");
    for entry in window {
        let _ = write!(out, "\nUser: {}\n", entry.instruction);
        if let Some(summary) = &entry.result_summary {
            let family = entry.action_family.as_deref().unwrap_or("action");
            let _ = writeln!(out, "Tool result ({family}): {summary}");
        }
        if let Some(text) = &entry.response_text {
            let _ = writeln!(out, "Assistant: {text}");
        }
    }
    out
}
