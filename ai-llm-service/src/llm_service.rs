//! Process-wide model handle.
//!
//! Construct once at startup, wrap in `Arc`, and pass clones to dependents.
//! There is no global client: every consumer receives the handle explicitly.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::{GenerationOptions, LanguageModel, LlmService};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = Arc::new(LlmService::from_env()?);
//! let txt = svc.generate("Hello world", &GenerationOptions::single(64)).await?;
//! println!("{txt}");
//! # Ok(()) }
//! ```

use std::sync::Arc;

use tracing::info;

use crate::{
    config::{
        default_config::{config_from_env, grounding_from_env},
        llm_model_config::LlmModelConfig,
        llm_provider::LlmProvider,
    },
    error_handler::Result,
    model::{GenerationOptions, LanguageModel},
    services::{
        gemini_service::{GeminiService, VertexSearchGrounding},
        ollama_service::OllamaService,
    },
};

/// Provider-dispatching language model.
#[derive(Debug, Clone)]
pub enum LlmService {
    Ollama(Arc<OllamaService>),
    Gemini(Arc<GeminiService>),
}

impl LlmService {
    /// Builds the client for the given config.
    pub fn new(cfg: LlmModelConfig) -> Result<Self> {
        Ok(match cfg.provider {
            LlmProvider::Ollama => LlmService::Ollama(Arc::new(OllamaService::new(cfg)?)),
            LlmProvider::Gemini => LlmService::Gemini(Arc::new(GeminiService::new(cfg)?)),
        })
    }

    /// Builds the client from environment (see [`crate::config::default_config`]).
    pub fn from_env() -> Result<Self> {
        Self::new(config_from_env()?)
    }

    pub fn config(&self) -> &LlmModelConfig {
        match self {
            LlmService::Ollama(s) => s.config(),
            LlmService::Gemini(s) => s.config(),
        }
    }

    /// Grounding collaborator sharing this client, if the provider supports it
    /// and grounding is enabled in the environment.
    pub fn grounding_from_env(&self) -> Result<Option<VertexSearchGrounding>> {
        let LlmService::Gemini(svc) = self else {
            return Ok(None);
        };
        let grounding = grounding_from_env(svc.config())?.map(|g| {
            info!(datastore = %g.datastore, "grounding enabled");
            VertexSearchGrounding::new(svc.clone(), g)
        });
        Ok(grounding)
    }
}

impl LanguageModel for LlmService {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        match self {
            LlmService::Ollama(s) => s.generate_text(prompt, options).await,
            LlmService::Gemini(s) => s.generate_text(prompt, options).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ollama_has_no_grounding() {
        let svc = LlmService::new(LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "llama3".into(),
            endpoint: "http://localhost:11434".into(),
            api_key: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: None,
        })
        .unwrap();
        assert!(matches!(svc, LlmService::Ollama(_)));
        assert_eq!(svc.config().model, "llama3");
        assert!(svc.grounding_from_env().unwrap().is_none());
    }
}
