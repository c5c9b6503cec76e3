//! Gemini on Vertex AI: plain and grounded generation over REST.
//!
//! Endpoint: `POST {endpoint}/{model}:generateContent` with a bearer token,
//! where `endpoint` is the Vertex AI publisher-models collection of a project
//! (see [`crate::config::default_config::vertex_models_endpoint`]).
//!
//! Grounded generation attaches a Vertex AI Search retrieval tool and reads the
//! retrieved documents from `groundingMetadata.groundingChunks` of the first
//! candidate.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::{
    config::{
        llm_model_config::{GroundingConfig, LlmModelConfig},
        llm_provider::LlmProvider,
    },
    error_handler::{
        AiLlmError, HttpError, ProviderError, ProviderErrorKind, Result, is_http_endpoint,
        make_snippet,
    },
    model::{GenerationOptions, GroundedAnswer, GroundedModel, GroundingSource, LanguageModel},
};

/// Thin client for Gemini `generateContent`.
#[derive(Debug)]
pub struct GeminiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    timeout: Duration,
    url_generate: String,
}

impl GeminiService {
    /// Creates a new [`GeminiService`].
    ///
    /// # Errors
    /// - `InvalidProvider` if `cfg.provider` is not Gemini
    /// - `MissingApiKey` if no access token is configured
    /// - `InvalidEndpoint` if `cfg.endpoint` is not http/https
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self> {
        if cfg.provider != LlmProvider::Gemini {
            return Err(
                ProviderError::new(LlmProvider::Gemini, ProviderErrorKind::InvalidProvider).into(),
            );
        }
        let token = cfg.api_key.clone().ok_or_else(|| {
            ProviderError::new(LlmProvider::Gemini, ProviderErrorKind::MissingApiKey)
        })?;
        if !is_http_endpoint(&cfg.endpoint) {
            return Err(ProviderError::new(
                LlmProvider::Gemini,
                ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone()),
            )
            .into());
        }

        let mut headers = header::HeaderMap::new();
        let auth = header::HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
            ProviderError::new(
                LlmProvider::Gemini,
                ProviderErrorKind::Decode(format!("invalid access token header: {e}")),
            )
        })?;
        headers.insert(header::AUTHORIZATION, auth);

        let timeout = cfg.timeout();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .gzip(true)
            .build()?;

        let url_generate = format!(
            "{}/{}:generateContent",
            cfg.endpoint.trim().trim_end_matches('/'),
            cfg.model
        );

        info!(
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            timeout_secs = timeout.as_secs(),
            "GeminiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            timeout,
            url_generate,
        })
    }

    pub fn config(&self) -> &LlmModelConfig {
        &self.cfg
    }

    /// Sends one `generateContent` request and returns the decoded response.
    async fn post(&self, body: &GenerateContentRequest<'_>) -> Result<GenerateContentResponse> {
        let started = Instant::now();
        debug!(grounded = body.tools.is_some(), "POST {}", self.url_generate);

        let resp = self
            .client
            .post(&self.url_generate)
            .json(body)
            .send()
            .await
            .map_err(|e| AiLlmError::from_transport(e, self.timeout))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_generate.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);
            error!(
                %status,
                %url,
                %snippet,
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "generateContent returned non-success status"
            );
            return Err(ProviderError::new(
                LlmProvider::Gemini,
                ProviderErrorKind::HttpStatus(HttpError {
                    status,
                    url,
                    snippet,
                }),
            )
            .into());
        }

        let out: GenerateContentResponse = resp.json().await.map_err(|e| {
            ProviderError::new(
                LlmProvider::Gemini,
                ProviderErrorKind::Decode(format!(
                    "serde error: {e}; expected `candidates[].content.parts[].text`"
                )),
            )
        })?;

        debug!(
            latency_ms = started.elapsed().as_millis(),
            candidates = out.candidates.len(),
            "generateContent completed"
        );
        Ok(out)
    }

    /// Plain generation; returns the text of the first candidate.
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn generate_text(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        let body = GenerateContentRequest::new(&self.cfg, prompt, options, None);
        let out = self.post(&body).await?;
        out.into_answer().map(|a| a.text)
    }

    /// Generation grounded in the given Vertex AI Search datastore.
    #[instrument(skip_all, fields(model = %self.cfg.model, datastore = %grounding.datastore))]
    pub async fn generate_grounded_in(
        &self,
        prompt: &str,
        options: &GenerationOptions,
        grounding: &GroundingConfig,
    ) -> Result<GroundedAnswer> {
        let body = GenerateContentRequest::new(&self.cfg, prompt, options, Some(grounding));
        let out = self.post(&body).await?;
        out.into_answer()
    }
}

impl LanguageModel for GeminiService {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        self.generate_text(prompt, options).await
    }
}

/// [`GroundedModel`] backed by Gemini and a Vertex AI Search datastore.
///
/// Shares the [`GeminiService`] (and its HTTP client) with the plain path.
#[derive(Debug, Clone)]
pub struct VertexSearchGrounding {
    service: Arc<GeminiService>,
    grounding: GroundingConfig,
}

impl VertexSearchGrounding {
    pub fn new(service: Arc<GeminiService>, grounding: GroundingConfig) -> Self {
        Self { service, grounding }
    }

    pub fn datastore(&self) -> &str {
        &self.grounding.datastore
    }
}

impl GroundedModel for VertexSearchGrounding {
    async fn generate_grounded(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GroundedAnswer> {
        self.service
            .generate_grounded_in(prompt, options, &self.grounding)
            .await
    }
}

/* ==========================
HTTP payloads
========================== */

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool<'a>>>,
}

impl<'a> GenerateContentRequest<'a> {
    fn new(
        cfg: &LlmModelConfig,
        prompt: &'a str,
        call: &GenerationOptions,
        grounding: Option<&'a GroundingConfig>,
    ) -> Self {
        let tools = grounding.map(|g| {
            vec![Tool {
                retrieval: Retrieval {
                    vertex_ai_search: VertexAiSearch {
                        datastore: &g.datastore,
                    },
                },
            }]
        });

        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                candidate_count: call.candidate_count,
                max_output_tokens: call.max_output_tokens.or(cfg.max_tokens),
                temperature: call.temperature.or(cfg.temperature),
                top_p: cfg.top_p,
            },
            tools,
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    candidate_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Debug, Serialize)]
struct Tool<'a> {
    retrieval: Retrieval<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Retrieval<'a> {
    vertex_ai_search: VertexAiSearch<'a>,
}

#[derive(Debug, Serialize)]
struct VertexAiSearch<'a> {
    datastore: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartOut>,
}

#[derive(Debug, Deserialize)]
struct PartOut {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingChunk {
    #[serde(default)]
    retrieved_context: Option<RetrievedContext>,
}

#[derive(Debug, Deserialize)]
struct RetrievedContext {
    #[serde(default)]
    title: String,
    #[serde(default)]
    uri: String,
}

impl GenerateContentResponse {
    /// Text and grounding sources of the first candidate.
    fn into_answer(self) -> Result<GroundedAnswer> {
        let first = self.candidates.into_iter().next().ok_or_else(|| {
            ProviderError::new(LlmProvider::Gemini, ProviderErrorKind::EmptyCandidates)
        })?;

        let text: String = first
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        let sources = first
            .grounding_metadata
            .map(|m| {
                m.grounding_chunks
                    .into_iter()
                    .filter_map(|c| c.retrieved_context)
                    .map(|rc| GroundingSource {
                        title: rc.title,
                        uri: rc.uri,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(GroundedAnswer { text, sources })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cfg() -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Gemini,
            model: "gemini-1.5-flash-001".into(),
            endpoint: "https://europe-west1-aiplatform.googleapis.com/v1/projects/acme/locations/europe-west1/publishers/google/models".into(),
            api_key: Some("token".into()),
            max_tokens: None,
            temperature: Some(1.0),
            top_p: None,
            timeout_secs: Some(10),
        }
    }

    #[test]
    fn plain_request_shape() {
        let cfg = cfg();
        let opts = GenerationOptions::single(400);
        let body =
            serde_json::to_value(GenerateContentRequest::new(&cfg, "classify", &opts, None))
                .unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{ "role": "user", "parts": [{ "text": "classify" }] }],
                "generationConfig": { "candidateCount": 1, "maxOutputTokens": 400, "temperature": 1.0 }
            })
        );
    }

    #[test]
    fn grounded_request_carries_retrieval_tool() {
        let cfg = cfg();
        let g = GroundingConfig::new("acme", "eu", "db_hackathon_acme");
        let opts = GenerationOptions::default().with_temperature(0.0);
        let body =
            serde_json::to_value(GenerateContentRequest::new(&cfg, "q", &opts, Some(&g))).unwrap();
        assert_eq!(
            body["tools"][0]["retrieval"]["vertexAiSearch"]["datastore"],
            "projects/acme/locations/eu/collections/default_collection/dataStores/db_hackathon_acme"
        );
        assert_eq!(body["generationConfig"]["temperature"], 0.0);
    }

    #[test]
    fn decodes_text_and_grounding_chunks() {
        let raw = json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Alphabet " }, { "text": "owns Waymo." }] },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "retrievedContext": { "uri": "gs://docs/10k.pdf", "title": "10k.pdf" } },
                        { "web": { "uri": "https://example.com" } }
                    ]
                }
            }]
        });
        let resp: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        let ans = resp.into_answer().unwrap();
        assert_eq!(ans.text, "Alphabet owns Waymo.");
        assert_eq!(
            ans.sources,
            vec![GroundingSource {
                title: "10k.pdf".into(),
                uri: "gs://docs/10k.pdf".into()
            }]
        );
    }

    #[test]
    fn empty_candidates_is_an_error() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(resp.into_answer().is_err());
    }

    #[test]
    fn constructor_requires_token() {
        let mut c = cfg();
        c.api_key = None;
        assert!(GeminiService::new(c).is_err());
    }

    #[test]
    fn url_targets_model() {
        let svc = GeminiService::new(cfg()).unwrap();
        assert!(svc.url_generate.ends_with("/models/gemini-1.5-flash-001:generateContent"));
    }
}
