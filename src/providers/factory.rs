use super::ollama::OllamaProvider;
use super::traits::Provider;
use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};

pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn Provider>> {
    match config.kind.trim().to_ascii_lowercase().as_str() {
        "ollama" => Ok(Box::new(OllamaProvider::new(
            Some(config.base_url.as_str()),
            config.timeout_secs,
        ))),
        other => Err(ProviderError::UnknownKind(other.to_string()).into()),
    }
}
