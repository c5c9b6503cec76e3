//! Default model configs loaded strictly from environment variables.
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND`         = provider kind (`gemini` default, or `ollama`)
//! - `LLM_MAX_TOKENS`   = optional default output-token budget (u32)
//! - `LLM_TIMEOUT_SECS` = optional request timeout (u64, default 60)
//!
//! Ollama-specific:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (mandatory)
//! - `OLLAMA_MODEL`                = model (mandatory)
//!
//! Gemini (Vertex AI) specific:
//! - `GOOGLE_CLOUD_PROJECT` = project id (mandatory)
//! - `GOOGLE_CLOUD_REGION`  = region (default `europe-west1`)
//! - `GEMINI_MODEL`         = model (default `gemini-1.5-flash-001`)
//! - `GEMINI_ENDPOINT`      = optional override of the models collection URL
//! - `GOOGLE_ACCESS_TOKEN`  = OAuth bearer token (mandatory)
//!
//! Grounding (Gemini only):
//! - `GROUNDING_ENABLED` = `true` (default) / `false`
//! - `SEARCH_LOCATION`   = datastore location (default `eu`)
//! - `SEARCH_DATASTORE`  = datastore id (default `db_hackathon_{project}`)

use crate::{
    config::{
        llm_model_config::{GroundingConfig, LlmModelConfig},
        llm_provider::LlmProvider,
    },
    error_handler::{
        AiLlmError, ConfigError, env_opt, env_opt_bool, env_opt_u32, env_opt_u64, must_env,
        validate_http_endpoint,
    },
};

pub const DEFAULT_REGION: &str = "europe-west1";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-001";
pub const DEFAULT_SEARCH_LOCATION: &str = "eu";

/// Builds the config for the provider selected by `LLM_KIND`.
///
/// # Errors
/// - [`ConfigError::UnsupportedProvider`] for unknown kinds
/// - any error of the provider-specific constructor
pub fn config_from_env() -> Result<LlmModelConfig, AiLlmError> {
    let kind = match env_opt("LLM_KIND") {
        Some(k) => k.parse::<LlmProvider>()?,
        None => LlmProvider::Gemini,
    };
    match kind {
        LlmProvider::Ollama => config_ollama(),
        LlmProvider::Gemini => config_gemini(),
    }
}

/// Resolves the Ollama endpoint strictly from environment.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
fn ollama_endpoint() -> Result<String, AiLlmError> {
    if let Some(url) = env_opt("OLLAMA_URL") {
        validate_http_endpoint("OLLAMA_URL", &url)?;
        return Ok(url);
    }
    if let Some(port) = env_opt("OLLAMA_PORT") {
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(format!("http://localhost:{port}"));
    }
    Err(AiLlmError::Config(ConfigError::MissingVar(
        "OLLAMA_URL or OLLAMA_PORT",
    )))
}

/// Constructs the Ollama config.
///
/// # Defaults
/// - `temperature = Some(1.0)`
/// - `timeout_secs = Some(60)`
pub fn config_ollama() -> Result<LlmModelConfig, AiLlmError> {
    let endpoint = ollama_endpoint()?;
    let model = must_env("OLLAMA_MODEL")?;

    Ok(LlmModelConfig {
        provider: LlmProvider::Ollama,
        model,
        endpoint,
        api_key: None,
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: Some(1.0),
        top_p: None,
        timeout_secs: Some(env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(60)),
    })
}

/// Constructs the Gemini (Vertex AI) config.
pub fn config_gemini() -> Result<LlmModelConfig, AiLlmError> {
    let project = must_env("GOOGLE_CLOUD_PROJECT")?;
    let region = env_opt("GOOGLE_CLOUD_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string());
    let endpoint = match env_opt("GEMINI_ENDPOINT") {
        Some(url) => {
            validate_http_endpoint("GEMINI_ENDPOINT", &url)?;
            url
        }
        None => vertex_models_endpoint(&project, &region),
    };

    Ok(LlmModelConfig {
        provider: LlmProvider::Gemini,
        model: env_opt("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        endpoint,
        api_key: Some(must_env("GOOGLE_ACCESS_TOKEN")?),
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: Some(1.0),
        top_p: None,
        timeout_secs: Some(env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(60)),
    })
}

/// Grounding settings for Gemini configs; `None` for other providers or when
/// `GROUNDING_ENABLED=false`.
pub fn grounding_from_env(cfg: &LlmModelConfig) -> Result<Option<GroundingConfig>, AiLlmError> {
    if cfg.provider != LlmProvider::Gemini {
        return Ok(None);
    }
    if !env_opt_bool("GROUNDING_ENABLED")?.unwrap_or(true) {
        return Ok(None);
    }
    let project = must_env("GOOGLE_CLOUD_PROJECT")?;
    let location =
        env_opt("SEARCH_LOCATION").unwrap_or_else(|| DEFAULT_SEARCH_LOCATION.to_string());
    let datastore_id =
        env_opt("SEARCH_DATASTORE").unwrap_or_else(|| default_datastore_id(&project));
    Ok(Some(GroundingConfig::new(&project, &location, &datastore_id)))
}

/// Vertex AI publisher-models collection for a project/region.
pub fn vertex_models_endpoint(project: &str, region: &str) -> String {
    format!(
        "https://{region}-aiplatform.googleapis.com/v1/projects/{project}/locations/{region}/publishers/google/models"
    )
}

/// Datastore id created by the setup tooling for a project.
pub fn default_datastore_id(project: &str) -> String {
    format!("db_hackathon_{project}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_endpoint_uses_region_twice() {
        assert_eq!(
            vertex_models_endpoint("acme", "europe-west1"),
            "https://europe-west1-aiplatform.googleapis.com/v1/projects/acme/locations/europe-west1/publishers/google/models"
        );
    }

    #[test]
    fn datastore_id_is_project_scoped() {
        assert_eq!(default_datastore_id("acme"), "db_hackathon_acme");
    }

    #[test]
    fn no_grounding_for_ollama() {
        let cfg = LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "llama3".into(),
            endpoint: "http://localhost:11434".into(),
            api_key: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: None,
        };
        assert!(grounding_from_env(&cfg).unwrap().is_none());
    }
}
