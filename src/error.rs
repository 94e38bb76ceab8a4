use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `sysops-agent`.
///
/// Returned by config loading and provider construction. The binary wraps it
/// in `anyhow` for context chains. Failures of an executed action are never
/// errors: they travel inside a
/// [`ResultEnvelope`](crate::dispatch::ResultEnvelope), and a rejected action
/// is a [`ValidationError`] carried by the turn outcome.
#[derive(Debug, Error)]
pub enum SysopsError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Inference provider ──────────────────────────────────────────────
    #[error("provider: {0}")]
    Provider(#[from] ProviderError),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("failed to save config: {0}")]
    Save(String),

    #[error("validation failed: {0}")]
    Validation(String),
}

// ─── Provider errors ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider {provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("provider {provider} did not answer within {timeout_secs}s")]
    Timeout { provider: String, timeout_secs: u64 },

    #[error("unknown provider kind: {0}")]
    UnknownKind(String),
}

// ─── Validation errors ──────────────────────────────────────────────────────

/// Structural rejection of an action. Raised before any external invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown action family '{0}'")]
    UnknownFamily(String),

    #[error("'{family}' has no sub-action '{sub_action}'")]
    UnknownSubAction { family: String, sub_action: String },

    #[error("missing required argument '{0}'")]
    MissingArgument(String),

    #[error("argument '{name}' does not accept '{value}'")]
    InvalidValue { name: String, value: String },
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, SysopsError>;
