//! Prompt system for ANA-RAG.
//!
//! This crate provides structured prompt management with:
//! - A built-in answer prompt (agricultural assistant persona)
//! - YAML overrides under `.ana/prompts/`
//! - Handlebars template rendering

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{answer_prompt, builtin_prompts, list_prompts, load_prompt, ANSWER_PROMPT_ID};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
