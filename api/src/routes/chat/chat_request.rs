use assistant::{AssistantReply, ChatHistory, DocumentRef};
use serde::{Deserialize, Serialize};

/// Request payload for /chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Turns before `query`, oldest first.
    #[serde(default)]
    pub history: ChatHistory,
    /// Latest user query.
    pub query: String,
}

/// Response payload for /chat.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Intent label chosen by the classifier.
    pub intent: String,
    /// Answer text.
    pub response: String,
    /// Sources of a grounded answer; empty for free answers.
    pub documents: Vec<DocumentRef>,
}

impl From<AssistantReply> for ChatResponse {
    fn from(r: AssistantReply) -> Self {
        Self {
            intent: r.intent.intent,
            response: r.response,
            documents: r.documents,
        }
    }
}
