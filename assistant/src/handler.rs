//! One chat turn: classify, then answer grounded or free.

use ai_llm_service::{GenerationOptions, GroundedModel, LanguageModel};
use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    history::ChatHistory,
    intent::{Intent, Route, classify_intent},
    prompt::chat_prompt,
    references::{DocumentRef, documents_from_sources},
    settings::AssistantSettings,
};

/// Answer for one turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantReply {
    pub intent: Intent,
    pub response: String,
    pub documents: Vec<DocumentRef>,
}

/// Chat assistant over an injected model and an optional grounding backend.
///
/// Stateless between calls: the conversation history comes in with every turn.
#[derive(Debug, Clone)]
pub struct Assistant<M, G> {
    model: M,
    grounding: Option<G>,
    settings: AssistantSettings,
}

impl<M, G> Assistant<M, G>
where
    M: LanguageModel,
    G: GroundedModel,
{
    pub fn new(model: M, grounding: Option<G>, settings: AssistantSettings) -> Self {
        Self {
            model,
            grounding,
            settings,
        }
    }

    pub fn settings(&self) -> &AssistantSettings {
        &self.settings
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn has_grounding(&self) -> bool {
        self.grounding.is_some()
    }

    /// Handles `query` given the turns before it, using local time in prompts.
    pub async fn handle_query(&self, history: &ChatHistory, query: &str) -> AssistantReply {
        self.handle_query_at(history, query, &Local::now()).await
    }

    /// Same as [`Self::handle_query`] with an explicit clock.
    #[instrument(skip_all, fields(turns = history.messages().len()))]
    pub async fn handle_query_at<Tz>(
        &self,
        history: &ChatHistory,
        query: &str,
        now: &DateTime<Tz>,
    ) -> AssistantReply
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let history = history.render();
        let intent = classify_intent(
            &self.model,
            &self.settings.topic,
            &history,
            query,
            self.settings.intent_max_output_tokens,
        )
        .await;
        let prompt = chat_prompt(now, &history, query);

        let route = intent.route(&self.settings.topic);
        info!(intent = %intent.intent, ?route, "routing query");

        if route == Route::Grounded {
            match &self.grounding {
                Some(grounding) => {
                    let options = GenerationOptions::default().with_temperature(0.0);
                    match grounding.generate_grounded(&prompt, &options).await {
                        Ok(answer) => {
                            return AssistantReply {
                                intent,
                                response: answer.text,
                                documents: documents_from_sources(&answer.sources),
                            };
                        }
                        Err(e) => {
                            warn!(error = %e, "grounded search failed; answering without grounding");
                        }
                    }
                }
                None => warn!("no grounding backend configured; answering without grounding"),
            }
        }

        let response = self.ask_model(&prompt).await;
        AssistantReply {
            intent,
            response,
            documents: Vec::new(),
        }
    }

    /// Free generation; a failed call becomes an apology carrying the error.
    async fn ask_model(&self, prompt: &str) -> String {
        let options = GenerationOptions::single(self.settings.chat_max_output_tokens)
            .with_temperature(self.settings.chat_temperature);
        match self.model.generate(prompt, &options).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "free generation failed");
                format!("Oh no! A problem occurred:\n{e}\n")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ai_llm_service::{
        AiLlmError, GroundedAnswer, GroundingSource,
        config::llm_provider::LlmProvider,
        error_handler::{ProviderError, ProviderErrorKind},
    };
    use chrono::Utc;

    use crate::history::ChatMessage;

    /// Classifier replies with `intent_json`; chat calls reply with `answer`.
    struct TwoStepModel {
        intent_json: &'static str,
        answer: Option<&'static str>,
    }

    impl LanguageModel for TwoStepModel {
        async fn generate(
            &self,
            prompt: &str,
            _options: &GenerationOptions,
        ) -> ai_llm_service::Result<String> {
            if prompt.contains("identify the intent") {
                return Ok(self.intent_json.to_string());
            }
            match self.answer {
                Some(a) => Ok(a.to_string()),
                None => Err(AiLlmError::from(ProviderError::new(
                    LlmProvider::Ollama,
                    ProviderErrorKind::EmptyCandidates,
                ))),
            }
        }
    }

    struct FakeSearch {
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeSearch {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl GroundedModel for FakeSearch {
        async fn generate_grounded(
            &self,
            prompt: &str,
            options: &GenerationOptions,
        ) -> ai_llm_service::Result<GroundedAnswer> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(options.temperature, Some(0.0));
            assert!(prompt.ends_with("chatbot: "));
            if self.fail {
                return Err(AiLlmError::from(ProviderError::new(
                    LlmProvider::Gemini,
                    ProviderErrorKind::EmptyCandidates,
                )));
            }
            Ok(GroundedAnswer {
                text: "Waymo is an Alphabet company.".into(),
                sources: vec![GroundingSource {
                    title: "10k.pdf".into(),
                    uri: "gs://docs/10k.pdf".into(),
                }],
            })
        }
    }

    fn history() -> ChatHistory {
        ChatHistory::from(vec![ChatMessage::user("hi"), ChatMessage::chatbot("hello!")])
    }

    async fn run<G: GroundedModel>(
        model: TwoStepModel,
        grounding: Option<G>,
    ) -> (AssistantReply, Assistant<TwoStepModel, G>) {
        let a = Assistant::new(model, grounding, AssistantSettings::default());
        let now = Utc::now();
        let reply = a.handle_query_at(&history(), "What is Waymo?", &now).await;
        (reply, a)
    }

    #[tokio::test]
    async fn topic_intent_uses_grounding() {
        let model = TwoStepModel {
            intent_json: r#"{"intent": "alphabet"}"#,
            answer: Some("free answer"),
        };
        let (reply, a) = run(model, Some(FakeSearch::new(false))).await;
        assert_eq!(reply.intent, Intent::new("alphabet"));
        assert_eq!(reply.response, "Waymo is an Alphabet company.");
        assert_eq!(reply.documents.len(), 1);
        assert_eq!(reply.documents[0].name, "[1] 10k.pdf");
        assert_eq!(a.grounding.unwrap().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn other_intent_answers_freely() {
        let model = TwoStepModel {
            intent_json: r#"{"intent": "other"}"#,
            answer: Some("An elephant runs about 40 km/h."),
        };
        let (reply, a) = run(model, Some(FakeSearch::new(false))).await;
        assert_eq!(reply.response, "An elephant runs about 40 km/h.");
        assert!(reply.documents.is_empty());
        assert_eq!(a.grounding.unwrap().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn grounding_failure_falls_back_to_free_answer() {
        let model = TwoStepModel {
            intent_json: r#"{"intent": "alphabet"}"#,
            answer: Some("free answer"),
        };
        let (reply, _) = run(model, Some(FakeSearch::new(true))).await;
        assert_eq!(reply.intent, Intent::new("alphabet"));
        assert_eq!(reply.response, "free answer");
        assert!(reply.documents.is_empty());
    }

    #[tokio::test]
    async fn missing_grounding_falls_back_to_free_answer() {
        let model = TwoStepModel {
            intent_json: r#"{"intent": "alphabet"}"#,
            answer: Some("free answer"),
        };
        let (reply, _) = run::<FakeSearch>(model, None).await;
        assert_eq!(reply.response, "free answer");
    }

    #[tokio::test]
    async fn model_failure_becomes_apology() {
        let model = TwoStepModel {
            intent_json: "garbage",
            answer: None,
        };
        let (reply, _) = run::<FakeSearch>(model, None).await;
        assert_eq!(reply.intent, Intent::default());
        assert!(reply.response.starts_with("Oh no! A problem occurred:\n"));
        assert!(reply.response.ends_with('\n'));
    }
}
