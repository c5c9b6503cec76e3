//! Language-model collaborators for the hackbot assistant.
//!
//! - [`model`]: the `LanguageModel` / `GroundedModel` capabilities.
//! - [`services`]: Ollama and Vertex AI Gemini clients.
//! - [`llm_service`]: provider dispatch, built once from config.
//! - [`telemetry`]: tracing subscriber setup shared by binaries.

pub mod config;
pub mod error_handler;
pub mod llm_service;
pub mod model;
pub mod services;
pub mod telemetry;

pub use error_handler::{AiLlmError, Result};
pub use llm_service::LlmService;
pub use model::{GenerationOptions, GroundedAnswer, GroundedModel, GroundingSource, LanguageModel};
