//! Assistant knobs loaded from environment.
//!
//! - `ASSISTANT_TOPIC`             = intent label that selects grounding (default `alphabet`)
//! - `ASSISTANT_TOPIC_DESCRIPTION` = how the classifier prompt describes that topic
//! - `CHAT_TEMPERATURE`            = free-generation temperature (default `1.0`, `0.0..=2.0`)
//! - `CHAT_MAX_OUTPUT_TOKENS`      = free-generation budget (default `2048`)
//! - `INTENT_MAX_OUTPUT_TOKENS`    = classifier budget (default `400`)

use ai_llm_service::error_handler::{
    Result, env_opt, env_opt_f32, env_opt_u32, validate_range_f32,
};

pub const DEFAULT_TOPIC_LABEL: &str = "alphabet";
pub const DEFAULT_TOPIC_DESCRIPTION: &str =
    "the company alphabet, including its subsidiaries (also called bets)";

/// The subject area answered from the search index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundingTopic {
    /// Intent label the classifier emits for this topic.
    pub label: String,
    /// Noun phrase used in the classifier prompt.
    pub description: String,
}

impl Default for GroundingTopic {
    fn default() -> Self {
        Self {
            label: DEFAULT_TOPIC_LABEL.to_string(),
            description: DEFAULT_TOPIC_DESCRIPTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssistantSettings {
    pub topic: GroundingTopic,
    pub chat_temperature: f32,
    pub chat_max_output_tokens: u32,
    pub intent_max_output_tokens: u32,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            topic: GroundingTopic::default(),
            chat_temperature: 1.0,
            chat_max_output_tokens: 2048,
            intent_max_output_tokens: 400,
        }
    }
}

impl AssistantSettings {
    pub fn from_env() -> Result<Self> {
        let d = Self::default();

        let topic = GroundingTopic {
            label: env_opt("ASSISTANT_TOPIC")
                .map(|s| s.trim().to_string())
                .unwrap_or(d.topic.label),
            description: env_opt("ASSISTANT_TOPIC_DESCRIPTION").unwrap_or(d.topic.description),
        };

        let chat_temperature = env_opt_f32("CHAT_TEMPERATURE")?.unwrap_or(d.chat_temperature);
        validate_range_f32("CHAT_TEMPERATURE", chat_temperature, 0.0, 2.0)?;

        Ok(Self {
            topic,
            chat_temperature,
            chat_max_output_tokens: env_opt_u32("CHAT_MAX_OUTPUT_TOKENS")?
                .unwrap_or(d.chat_max_output_tokens),
            intent_max_output_tokens: env_opt_u32("INTENT_MAX_OUTPUT_TOKENS")?
                .unwrap_or(d.intent_max_output_tokens),
        })
    }
}
