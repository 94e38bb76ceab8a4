mod env_overrides;
mod loader;
pub mod schema;

pub use loader::default_config_path;
pub use schema::{AgentConfig, Config, DispatchConfig, ProviderConfig, ServeConfig};
