//! Prompt builders for the classifier and the chat companion.

use chrono::{DateTime, TimeZone};

use crate::settings::GroundingTopic;

/// Classifier prompt asking for `{"intent": "<topic>" | "other"}` only.
pub fn intent_prompt(topic: &GroundingTopic, history: &str, query: &str) -> String {
    format!(
        r#"Given a conversation history between a user and a chatbot, your job is to identify the intent of the latest query by the user.
The intent can either be related to {description}, or the intent can be other.
Provide your output as JSON. Do not generate any other content. This is what your output should look like:
{{
   "intent": "{label}" if the question is related to {description}; "other" if it is any other topic
}}

Conversation history:
{history}

Latest query:
{query}

Your result:
"#,
        description = topic.description,
        label = topic.label,
    )
}

/// `Today is Monday, March 4 2024. The current time is 9:05.`
pub fn time_preamble<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "Today is {}. The current time is {}.\n",
        now.format("%A, %B %-d %Y"),
        now.format("%-H:%M")
    )
}

/// Chat companion prompt for both the free and the grounded path.
pub fn chat_prompt<Tz>(now: &DateTime<Tz>, history: &str, query: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut p = time_preamble(now);
    p.push_str(
        "You are a cheerful chat companion. Your input are a chat history between a chatbot and a user. \
         You are given the latest question from the user which you have to answer in a safe and joyful way.\n\
         Provide answers that are suitable for any audience. Try to keep your responses to a few lines of text. \
         For long answers, only mention the highlights.\n\n",
    );
    p.push_str(&format!("Chat history:\n{history}\n"));
    p.push_str(&format!("user: {query}\nchatbot: "));
    p
}
