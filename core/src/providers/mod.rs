pub mod anthropic;
pub mod factory;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use factory::{EnvProviderFactory, ProviderFactory};
pub use openai::OpenAIProvider;
