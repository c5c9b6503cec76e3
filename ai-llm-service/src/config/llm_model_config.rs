use crate::config::llm_provider::LlmProvider;

/// Configuration for a language-model client.
///
/// Built once at startup (see [`crate::config::default_config`]) and handed to
/// the provider service, which keeps it for the lifetime of the process.
///
/// # Fields
///
/// - `provider`: Which backend to use (Ollama, Gemini).
/// - `model`: The model identifier (e.g., `"gemini-1.5-flash-001"`, `"llama3"`).
/// - `endpoint`: Base URL. For Gemini this is the Vertex AI models collection,
///   `https://{region}-aiplatform.googleapis.com/v1/projects/{project}/locations/{region}/publishers/google/models`.
/// - `api_key`: Bearer token (Gemini); unused by Ollama.
/// - `max_tokens`: Default output-token budget when a call does not set one.
/// - `temperature`: Default sampling temperature when a call does not set one.
/// - `top_p`: Nucleus sampling parameter.
/// - `timeout_secs`: Request timeout in seconds.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::Ollama,
///     model: "llama3".to_string(),
///     endpoint: "http://localhost:11434".to_string(),
///     api_key: None,
///     max_tokens: Some(2048),
///     temperature: Some(0.7),
///     top_p: None,
///     timeout_secs: Some(60),
/// };
/// assert_eq!(cfg.timeout().as_secs(), 60);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// Effective request timeout (defaults to 60s).
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs.unwrap_or(60))
    }
}

/// Settings for grounded generation against a Vertex AI Search datastore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundingConfig {
    /// Full datastore resource path:
    /// `projects/{p}/locations/{loc}/collections/default_collection/dataStores/{id}`.
    pub datastore: String,
}

impl GroundingConfig {
    pub fn new(project: &str, location: &str, datastore_id: &str) -> Self {
        Self {
            datastore: format!(
                "projects/{project}/locations/{location}/collections/default_collection/dataStores/{datastore_id}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datastore_path_layout() {
        let g = GroundingConfig::new("acme", "eu", "db_hackathon_acme");
        assert_eq!(
            g.datastore,
            "projects/acme/locations/eu/collections/default_collection/dataStores/db_hackathon_acme"
        );
    }
}
