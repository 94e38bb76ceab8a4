use async_trait::async_trait;

/// Text-in/text-out inference backend. Its output is untrusted.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    async fn chat_with_system(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<String>;
}
