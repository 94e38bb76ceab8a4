use reqwest::Client;
use std::time::Duration;

pub fn build_provider_client_with_timeout(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Turn a non-success HTTP response into an error with a bounded body excerpt.
pub async fn api_error(provider: &str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read provider error body>".to_string());
    let excerpt = crate::utils::text::truncate_with_marker(body.trim(), 200, "...");
    anyhow::anyhow!("{provider} API error ({status}): {excerpt}")
}
