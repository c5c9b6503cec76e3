use std::sync::Arc;

use ai_llm_service::{GroundedModel, LanguageModel};
use axum::{extract::State, http::StatusCode, response::Response};
use serde::{Deserialize, Serialize};

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Whether grounded answers are available.
    pub grounding: bool,
    /// Topic label routed to grounded search.
    pub topic: String,
}

/// Handler: GET /health. Needs no password.
pub async fn health_route<M, G>(State(state): State<Arc<AppState<M, G>>>) -> Response
where
    M: LanguageModel + 'static,
    G: GroundedModel + 'static,
{
    let body = HealthResponse {
        status: "ok".into(),
        grounding: state.assistant.has_grounding(),
        topic: state.assistant.settings().topic.label.clone(),
    };
    ApiResponse::success(body).into_response_with_status(StatusCode::OK)
}
