use super::http_client::{api_error, build_provider_client_with_timeout};
use super::traits::Provider;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

pub struct OllamaProvider {
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    options: Options,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct Options {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OllamaProvider {
    pub fn new(base_url: Option<&str>, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            client: build_provider_client_with_timeout(timeout_secs),
        }
    }

    fn build_request(
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        temperature: f64,
    ) -> ChatRequest {
        let mut messages = Vec::new();

        if let Some(sys) = system_prompt {
            messages.push(Message {
                role: "system",
                content: sys.to_string(),
            });
        }

        messages.push(Message {
            role: "user",
            content: message.to_string(),
        });

        ChatRequest {
            model: model.to_string(),
            messages,
            stream: false,
            options: Options { temperature },
        }
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn chat_with_system(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<String> {
        let request = Self::build_request(system_prompt, message, model, temperature);
        let url = format!("{}/api/chat", self.base_url);
        tracing::debug!(url = %url, model, "sending chat request");

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let err = api_error("Ollama", response).await;
            anyhow::bail!("{err}. Is Ollama running? (ollama serve)");
        }

        let chat: ChatResponse = response.json().await.map_err(anyhow::Error::msg)?;
        Ok(chat.message.content)
    }
}
