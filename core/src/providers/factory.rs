use crate::error::AssemblyError;
use crate::providers::{AnthropicProvider, OpenAIProvider};
use crate::traits::Provider;
use std::sync::Arc;

/// Builds a model-inference client from an allow-listed model id of the form
/// `provider/model`. A trait so assembly can be driven by scripted providers
/// in tests.
pub trait ProviderFactory: Send + Sync {
    fn create(&self, model_id: &str) -> Result<Arc<dyn Provider>, AssemblyError>;
}

/// Factory backed by API keys from the process environment.
#[derive(Debug, Default)]
pub struct EnvProviderFactory;

impl EnvProviderFactory {
    pub fn new() -> Self {
        Self
    }
}

impl ProviderFactory for EnvProviderFactory {
    fn create(&self, model_id: &str) -> Result<Arc<dyn Provider>, AssemblyError> {
        let (family, model) = model_id.split_once('/').ok_or_else(|| {
            AssemblyError::Provider {
                model: model_id.to_string(),
                reason: "expected a 'provider/model' id".to_string(),
            }
        })?;

        match family {
            "openai" => {
                let api_key = resolve_api_key(&["OPENAI_API_KEY", "BUREAU_OPENAI_API_KEY"])
                    .map_err(|reason| AssemblyError::Provider {
                        model: model_id.to_string(),
                        reason,
                    })?;
                Ok(Arc::new(OpenAIProvider::new(api_key).with_model(model)))
            }
            "anthropic" => {
                let api_key = resolve_api_key(&["ANTHROPIC_API_KEY", "BUREAU_ANTHROPIC_API_KEY"])
                    .map_err(|reason| AssemblyError::Provider {
                        model: model_id.to_string(),
                        reason,
                    })?;
                Ok(Arc::new(AnthropicProvider::new(api_key).with_model(model)))
            }
            other => Err(AssemblyError::Provider {
                model: model_id.to_string(),
                reason: format!("unsupported provider family '{other}'"),
            }),
        }
    }
}

fn resolve_api_key(env_vars: &[&str]) -> Result<String, String> {
    for var_name in env_vars {
        if let Ok(key) = std::env::var(var_name)
            && !key.is_empty()
        {
            return Ok(key);
        }
    }
    Err(format!("no API key found, set one of: {}", env_vars.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_id_without_family_is_rejected() {
        let err = EnvProviderFactory::new().create("gpt-4.1").unwrap_err();
        assert!(matches!(
            err,
            AssemblyError::Provider { model, .. } if model == "gpt-4.1"
        ));
    }

    #[test]
    fn unsupported_family_is_rejected() {
        let err = EnvProviderFactory::new()
            .create("mistral/large")
            .unwrap_err();
        assert!(matches!(
            err,
            AssemblyError::Provider { reason, .. } if reason.contains("mistral")
        ));
    }
}
