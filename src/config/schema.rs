use crate::dispatch::{DispatchSettings, MAX_OUTPUT_BYTES, expand_path};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "qwen2.5-coder:3b";

/// Top-level configuration, persisted as `~/.sysops/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Where this config was loaded from. Not persisted.
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Default tracing level (`error`, `warn`, `info`, `debug`, `trace`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub serve: ServeConfig,
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            log_level: default_log_level(),
            provider: ProviderConfig::default(),
            agent: AgentConfig::default(),
            dispatch: DispatchConfig::default(),
            serve: ServeConfig::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(ConfigError::Validation(format!(
                "provider.temperature must be within 0.0..=2.0, got {}",
                self.provider.temperature
            )));
        }
        if self.provider.model.trim().is_empty() {
            return Err(ConfigError::Validation("provider.model must not be empty".into()));
        }
        for (name, secs) in [
            ("provider.timeout_secs", self.provider.timeout_secs),
            ("dispatch.command_timeout_secs", self.dispatch.command_timeout_secs),
            ("dispatch.log_timeout_secs", self.dispatch.log_timeout_secs),
            (
                "agent.system_context_timeout_secs",
                self.agent.system_context_timeout_secs,
            ),
        ] {
            if secs == 0 {
                return Err(ConfigError::Validation(format!("{name} must be positive")));
            }
        }
        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::Validation(format!(
                "log_level '{}' is not a tracing level",
                self.log_level
            )));
        }
        Ok(())
    }
}

// ── Provider ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_kind")]
    pub kind: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Upper bound for one inference call.
    #[serde(default = "default_inference_timeout")]
    pub timeout_secs: u64,
}

fn default_provider_kind() -> String {
    "ollama".into()
}

fn default_base_url() -> String {
    crate::providers::ollama::DEFAULT_BASE_URL.into()
}

fn default_model() -> String {
    DEFAULT_MODEL.into()
}

fn default_temperature() -> f64 {
    0.2
}

fn default_inference_timeout() -> u64 {
    60
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: default_provider_kind(),
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_inference_timeout(),
        }
    }
}

// ── Agent ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Memory entries replayed into each prompt.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    #[serde(default = "default_result_summary_chars")]
    pub result_summary_chars: usize,
    /// Skip every confirmation prompt. Dangerous.
    #[serde(default)]
    pub auto_approve: bool,
    /// Script whose stdout describes the host; prepended to every prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_context_script: Option<String>,
    #[serde(default = "default_system_context_timeout")]
    pub system_context_timeout_secs: u64,
}

fn default_history_window() -> usize {
    crate::memory::DEFAULT_WINDOW
}

fn default_result_summary_chars() -> usize {
    crate::memory::DEFAULT_SUMMARY_CHARS
}

fn default_system_context_timeout() -> u64 {
    5
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            result_summary_chars: default_result_summary_chars(),
            auto_approve: false,
            system_context_script: None,
            system_context_timeout_secs: default_system_context_timeout(),
        }
    }
}

// ── Dispatch ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
    /// Journal and pod log retrieval.
    #[serde(default = "default_log_timeout")]
    pub log_timeout_secs: u64,
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,
    #[serde(default = "default_compositor_config")]
    pub compositor_config: String,
    #[serde(default = "default_status_bar_configs")]
    pub status_bar_configs: Vec<String>,
}

fn default_command_timeout() -> u64 {
    30
}

fn default_log_timeout() -> u64 {
    60
}

fn default_max_output_bytes() -> usize {
    MAX_OUTPUT_BYTES
}

fn default_compositor_config() -> String {
    "~/.config/sway/config".into()
}

fn default_status_bar_configs() -> Vec<String> {
    vec![
        "~/.config/waybar/config.jsonc".into(),
        "~/.config/waybar/config".into(),
    ]
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: default_command_timeout(),
            log_timeout_secs: default_log_timeout(),
            max_output_bytes: default_max_output_bytes(),
            compositor_config: default_compositor_config(),
            status_bar_configs: default_status_bar_configs(),
        }
    }
}

impl DispatchConfig {
    /// Resolved settings with `~` expanded.
    pub fn settings(&self) -> DispatchSettings {
        DispatchSettings {
            command_timeout: Duration::from_secs(self.command_timeout_secs),
            log_timeout: Duration::from_secs(self.log_timeout_secs),
            compositor_config: expand_path(&self.compositor_config),
            status_bar_configs: self
                .status_bar_configs
                .iter()
                .map(|p| expand_path(p))
                .collect(),
        }
    }
}

// ── Serve ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServeConfig {
    /// Let remote callers run actions that would otherwise need confirmation.
    #[serde(default)]
    pub auto_approve: bool,
}
