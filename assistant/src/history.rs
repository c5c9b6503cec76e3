//! Conversation history owned by the caller and passed into every turn.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Chatbot,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Chatbot => "chatbot",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn chatbot(text: impl Into<String>) -> Self {
        Self {
            role: Role::Chatbot,
            text: text.into(),
        }
    }
}

/// Ordered turns of one conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Prompt rendering: one `"<role>: <text>\n"` line per message.
    pub fn render(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("{}: {}\n", m.role, m.text))
            .collect()
    }
}

impl From<Vec<ChatMessage>> for ChatHistory {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_lines() {
        let h = ChatHistory::from(vec![
            ChatMessage::user("How fast is an elephant?"),
            ChatMessage::chatbot("About 40 km/h!"),
        ]);
        assert_eq!(
            h.render(),
            "user: How fast is an elephant?\nchatbot: About 40 km/h!\n"
        );
        assert_eq!(ChatHistory::new().render(), "");
    }

    #[test]
    fn serde_is_a_plain_list() {
        let h: ChatHistory =
            serde_json::from_str(r#"[{"role":"user","text":"hi"},{"role":"chatbot","text":"hello"}]"#)
                .unwrap();
        assert_eq!(h.messages().len(), 2);
        assert_eq!(h.messages()[1].role, Role::Chatbot);
    }
}
