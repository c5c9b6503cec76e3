//! Model-calling capabilities consumed by the assistant.
//!
//! Both traits are implemented by the concrete provider services and by test
//! fakes. Callers take them as generic parameters; nothing here is global.

use std::future::Future;

use serde::Serialize;

use crate::error_handler::Result;

/// Per-call generation knobs. Unset fields fall back to the provider config.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationOptions {
    pub candidate_count: Option<u32>,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl GenerationOptions {
    /// Single candidate with a bounded output budget.
    pub fn single(max_output_tokens: u32) -> Self {
        Self {
            candidate_count: Some(1),
            max_output_tokens: Some(max_output_tokens),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A document the grounded answer was based on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// Answer text plus its grounding sources.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroundedAnswer {
    pub text: String,
    pub sources: Vec<GroundingSource>,
}

/// Plain text generation.
pub trait LanguageModel: Send + Sync {
    fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Generation grounded in a document search index.
pub trait GroundedModel: Send + Sync {
    fn generate_grounded(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> impl Future<Output = Result<GroundedAnswer>> + Send;
}

impl<T: LanguageModel + ?Sized> LanguageModel for std::sync::Arc<T> {
    fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> impl Future<Output = Result<String>> + Send {
        (**self).generate(prompt, options)
    }
}

impl<T: GroundedModel + ?Sized> GroundedModel for std::sync::Arc<T> {
    fn generate_grounded(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> impl Future<Output = Result<GroundedAnswer>> + Send {
        (**self).generate_grounded(prompt, options)
    }
}
