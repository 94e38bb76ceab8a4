pub mod factory;
pub mod http_client;
pub mod ollama;
pub mod traits;

pub use factory::create_provider;
pub use ollama::OllamaProvider;
pub use traits::Provider;
