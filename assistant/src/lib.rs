//! Chat assistant core.
//!
//! Public API: [`Assistant::handle_query`]. It classifies the query with the
//! injected language model ([`intent::classify_intent`]), then answers either
//! from the document search index (grounded) or by free generation. The
//! classifier output goes through [`json_repair::extract_and_repair`] before
//! parsing, so wrapped or sloppily quoted JSON still routes correctly.

pub mod handler;
pub mod history;
pub mod intent;
pub mod json_repair;
pub mod prompt;
pub mod references;
pub mod settings;

pub use handler::{Assistant, AssistantReply};
pub use history::{ChatHistory, ChatMessage, Role};
pub use intent::{Intent, Route, classify_intent};
pub use json_repair::extract_and_repair;
pub use references::DocumentRef;
pub use settings::{AssistantSettings, GroundingTopic};
