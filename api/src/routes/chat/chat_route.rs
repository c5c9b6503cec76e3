//! POST /chat: one assistant turn.

use std::sync::Arc;

use ai_llm_service::{GroundedModel, LanguageModel};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, info};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppError,
    routes::chat::chat_request::{ChatRequest, ChatResponse},
};

/// Handler: POST /chat
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/chat \
///   -H "authorization: Bearer $PASSWORD" \
///   -H 'content-type: application/json' \
///   -d '{"history":[{"role":"user","text":"hi"},{"role":"chatbot","text":"hello!"}],"query":"What is Waymo?"}'
/// ```
pub async fn chat_route<M, G>(
    State(state): State<Arc<AppState<M, G>>>,
    headers: HeaderMap,
    Json(p): Json<ChatRequest>,
) -> Response
where
    M: LanguageModel + 'static,
    G: GroundedModel + 'static,
{
    let request_id = headers
        .get("X-Request-Id")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-");

    if let Err(e) = state.authorize(&headers) {
        info!(request_id = %request_id, "chat_route: rejected");
        return e.into_response();
    }

    let query = p.query.trim();
    if query.is_empty() {
        return AppError::BadRequest("query must not be empty".into()).into_response();
    }

    debug!(
        request_id = %request_id,
        turns = p.history.messages().len(),
        "chat_route: start"
    );

    let reply = state.assistant.handle_query(&p.history, query).await;

    debug!(
        request_id = %request_id,
        intent = %reply.intent.intent,
        documents = reply.documents.len(),
        "chat_route: done"
    );

    ApiResponse::success(ChatResponse::from(reply)).into_response_with_status(StatusCode::OK)
}
