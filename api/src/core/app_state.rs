use ai_llm_service::{
    GroundedModel, LanguageModel, LlmService, error_handler::env_opt,
    services::gemini_service::VertexSearchGrounding,
};
use assistant::{Assistant, AssistantSettings};
use axum::http::{HeaderMap, header};
use tracing::{info, warn};

use crate::error_handler::{AppError, AppResult};

/// Shared state for all HTTP handlers.
pub struct AppState<M, G> {
    pub assistant: Assistant<M, G>,
    /// Shared password from `PASSWORD`; `None` locks the chat endpoint.
    pub password: Option<String>,
}

/// State wired to the configured providers.
pub type LiveState = AppState<LlmService, VertexSearchGrounding>;

impl<M, G> AppState<M, G>
where
    M: LanguageModel,
    G: GroundedModel,
{
    pub fn new(assistant: Assistant<M, G>, password: Option<String>) -> Self {
        Self {
            assistant,
            password,
        }
    }

    /// Checks `Authorization: Bearer <PASSWORD>`.
    pub fn authorize(&self, headers: &HeaderMap) -> AppResult<()> {
        let Some(expected) = self.password.as_deref() else {
            return Err(AppError::Unauthorized);
        };
        let given = headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;
        if constant_time_eq(given.as_bytes(), expected.as_bytes()) {
            Ok(())
        } else {
            Err(AppError::Unauthorized)
        }
    }
}

impl LiveState {
    /// Builds the model clients and assistant from environment.
    pub fn from_env() -> AppResult<Self> {
        let model = LlmService::from_env()?;
        let cfg = model.config();
        info!(provider = %cfg.provider, model = %cfg.model, "language model configured");

        let grounding = model.grounding_from_env()?;
        let settings = AssistantSettings::from_env()?;

        let password = env_opt("PASSWORD");
        if password.is_none() {
            warn!("PASSWORD is not set; /chat will reject every request");
        }

        Ok(Self::new(
            Assistant::new(model, grounding, settings),
            password,
        ))
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
