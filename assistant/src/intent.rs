//! Intent routing: one classifier call per turn, never failing.
//!
//! Pipeline: prompt -> model call -> [`extract_and_repair`] -> JSON parse.
//! Each failure exit (model error, no braces, bad JSON) yields
//! [`Intent::default`], i.e. `{"intent": "other"}`.

use ai_llm_service::{GenerationOptions, LanguageModel};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::{json_repair::extract_and_repair, prompt::intent_prompt, settings::GroundingTopic};

/// Label meaning "not the grounded topic".
pub const OTHER: &str = "other";

/// Classifier output. The label is not checked against a closed set; anything
/// other than the topic label routes like [`OTHER`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub intent: String,
}

impl Default for Intent {
    fn default() -> Self {
        Self::new(OTHER)
    }
}

impl Intent {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            intent: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.intent
    }

    pub fn route(&self, topic: &GroundingTopic) -> Route {
        if self.intent == topic.label {
            Route::Grounded
        } else {
            Route::Direct
        }
    }
}

/// Downstream handler selected by an [`Intent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Answer from the document search index.
    Grounded,
    /// Answer by free generation.
    Direct,
}

/// Parses the classifier reply; `None` on missing braces or invalid JSON.
pub fn parse_intent(raw: &str) -> Option<Intent> {
    let Some(payload) = extract_and_repair(raw) else {
        warn!(raw = %raw, "no JSON object in intent response");
        return None;
    };
    match serde_json::from_str::<Intent>(&payload) {
        Ok(intent) => Some(intent),
        Err(e) => {
            warn!(error = %e, raw = %raw, "intent response parsing failed");
            None
        }
    }
}

/// Classifies the latest query. Never fails: errors map to the default intent.
#[instrument(skip_all, fields(query_len = query.len()))]
pub async fn classify_intent<M>(
    model: &M,
    topic: &GroundingTopic,
    history: &str,
    query: &str,
    max_output_tokens: u32,
) -> Intent
where
    M: LanguageModel + ?Sized,
{
    let prompt = intent_prompt(topic, history, query);
    let options = GenerationOptions::single(max_output_tokens);

    let raw = match model.generate(&prompt, &options).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "exception during intent detection");
            return Intent::default();
        }
    };

    let intent = parse_intent(&raw).unwrap_or_default();
    debug!(intent = %intent.intent, "intent detected");
    intent
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    use ai_llm_service::{
        AiLlmError,
        config::llm_provider::LlmProvider,
        error_handler::{ProviderError, ProviderErrorKind},
    };

    /// Replies with a fixed text, or fails when `reply` is `None`.
    pub(crate) struct ScriptedModel {
        pub reply: Option<String>,
        pub prompts: Mutex<Vec<(String, GenerationOptions)>>,
    }

    impl ScriptedModel {
        pub fn replying(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                reply: None,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl LanguageModel for ScriptedModel {
        async fn generate(
            &self,
            prompt: &str,
            options: &GenerationOptions,
        ) -> ai_llm_service::Result<String> {
            self.prompts
                .lock()
                .unwrap()
                .push((prompt.to_string(), *options));
            match &self.reply {
                Some(t) => Ok(t.clone()),
                None => Err(AiLlmError::from(ProviderError::new(
                    LlmProvider::Gemini,
                    ProviderErrorKind::EmptyCandidates,
                ))),
            }
        }
    }

    async fn classify(model: &ScriptedModel) -> Intent {
        classify_intent(model, &GroundingTopic::default(), "", "What is Waymo?", 400).await
    }

    #[tokio::test]
    async fn failing_model_gives_default() {
        assert_eq!(classify(&ScriptedModel::failing()).await, Intent::new("other"));
    }

    #[tokio::test]
    async fn garbage_gives_default() {
        let m = ScriptedModel::replying("I think this is about cars.");
        assert_eq!(classify(&m).await, Intent::new("other"));

        let m = ScriptedModel::replying("{not json at all}");
        assert_eq!(classify(&m).await, Intent::new("other"));
    }

    #[tokio::test]
    async fn topic_label_is_returned() {
        let m = ScriptedModel::replying(r#"{"intent": "alphabet"}"#);
        assert_eq!(classify(&m).await, Intent::new("alphabet"));
    }

    #[tokio::test]
    async fn wrapped_reply_is_extracted() {
        let m = ScriptedModel::replying("```json\n{\n  \"intent\": \"alphabet\"\n}\n```");
        assert_eq!(classify(&m).await, Intent::new("alphabet"));
    }

    #[tokio::test]
    async fn unknown_label_passes_through() {
        let m = ScriptedModel::replying(r#"{"intent": "weather"}"#);
        let intent = classify(&m).await;
        assert_eq!(intent.label(), "weather");
        assert_eq!(intent.route(&GroundingTopic::default()), Route::Direct);
    }

    #[tokio::test]
    async fn missing_intent_key_gives_default() {
        let m = ScriptedModel::replying(r#"{"topic": "alphabet"}"#);
        assert_eq!(classify(&m).await, Intent::default());
    }

    #[tokio::test]
    async fn requests_single_bounded_candidate() {
        let m = ScriptedModel::replying(r#"{"intent": "other"}"#);
        classify(&m).await;
        let calls = m.prompts.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.candidate_count, Some(1));
        assert_eq!(calls[0].1.max_output_tokens, Some(400));
        assert!(calls[0].0.contains("What is Waymo?"));
    }

    #[test]
    fn route_by_topic() {
        let topic = GroundingTopic::default();
        assert_eq!(Intent::new("alphabet").route(&topic), Route::Grounded);
        assert_eq!(Intent::default().route(&topic), Route::Direct);
    }
}
