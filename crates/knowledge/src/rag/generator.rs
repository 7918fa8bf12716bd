//! Answer generation through an ordered chain of model strategies.

use crate::rag::types::{Attempt, GenerationOutcome, GenerationStrategy};
use ana_core::{AppError, AppResult};
use ana_llm::{ChatMessage, ChatRequest, GenerationParameters, LlmClient, TextGenerationRequest};
use ana_prompt::{
    answer_prompt, build_prompt, load_prompt, BuiltPrompt, PromptDefinition, ANSWER_PROMPT_ID,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Sampling parameters for the raw text-generation strategy.
pub const TEXT_GENERATION_PARAMETERS: GenerationParameters = GenerationParameters {
    max_new_tokens: 300,
    temperature: 0.4,
    do_sample: false,
};

/// Calls the remote model, trying each strategy in order.
pub struct Generator {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
    strategies: Vec<GenerationStrategy>,
}

impl Generator {
    /// Generator using the built-in prompt and the chat then text-generation chain.
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            prompt: answer_prompt(),
            strategies: vec![GenerationStrategy::Chat, GenerationStrategy::TextGeneration],
        }
    }

    /// Generator using the answer prompt override from `workspace`, if any.
    pub fn for_workspace(
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        workspace: &Path,
    ) -> AppResult<Self> {
        let prompt = load_prompt(workspace, ANSWER_PROMPT_ID)?;
        Ok(Self::new(client, model).with_prompt(prompt))
    }

    pub fn with_prompt(mut self, prompt: PromptDefinition) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_strategies(mut self, strategies: Vec<GenerationStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// User-displayable answer text. Never fails.
    pub async fn generate(&self, query: &str, context: &str) -> String {
        self.generate_outcome(query, context).await.into_text()
    }

    /// Run the strategy chain and report how it ended.
    pub async fn generate_outcome(&self, query: &str, context: &str) -> GenerationOutcome {
        let prompt = match self.build(query, context) {
            Ok(prompt) => prompt,
            Err(e) => {
                log_failure(None, &e);
                return GenerationOutcome::Failed(e);
            }
        };

        for &strategy in &self.strategies {
            match self.attempt(strategy, &prompt).await {
                Ok(Attempt::Answer(text)) => {
                    tracing::info!(strategy = strategy.as_str(), "Generated answer");
                    return GenerationOutcome::Answered { text, strategy };
                }
                Ok(Attempt::Next) => {
                    tracing::debug!(
                        strategy = strategy.as_str(),
                        "No usable content, trying next strategy"
                    );
                }
                Err(e) => {
                    log_failure(Some(strategy), &e);
                    return GenerationOutcome::Failed(e);
                }
            }
        }

        tracing::warn!("All generation strategies returned empty content");
        GenerationOutcome::Exhausted
    }

    fn build(&self, query: &str, context: &str) -> AppResult<BuiltPrompt> {
        let mut variables = HashMap::new();
        variables.insert("context".to_string(), context.to_string());
        variables.insert("question".to_string(), query.to_string());
        build_prompt(&self.prompt, variables)
    }

    async fn attempt(
        &self,
        strategy: GenerationStrategy,
        prompt: &BuiltPrompt,
    ) -> AppResult<Attempt> {
        let text = match strategy {
            GenerationStrategy::Chat => {
                let mut messages = Vec::with_capacity(2);
                if let Some(system) = &prompt.system {
                    messages.push(ChatMessage::system(system.clone()));
                }
                messages.push(ChatMessage::user(prompt.user.clone()));

                let request = ChatRequest::new(&self.model, messages);
                let response = self.client.chat(&request).await?;
                response.first_content().map(str::to_string)
            }
            GenerationStrategy::TextGeneration => {
                let request = TextGenerationRequest::new(
                    &self.model,
                    prompt.user.clone(),
                    TEXT_GENERATION_PARAMETERS,
                );
                let output = self.client.text_generation(&request).await?;
                Some(output.into_text())
            }
        };

        Ok(match text.as_deref().map(str::trim) {
            Some(trimmed) if !trimmed.is_empty() => Attempt::Answer(trimmed.to_string()),
            _ => Attempt::Next,
        })
    }
}

fn log_failure(strategy: Option<GenerationStrategy>, error: &AppError) {
    let (status, body) = match error.http_response() {
        Some((status, body)) => (Some(status), Some(body)),
        None => (None, None),
    };

    tracing::error!(
        strategy = strategy.map(|s| s.as_str()),
        kind = error.kind(),
        repr = ?error,
        status = ?status,
        body = ?body,
        "Error generating answer with the remote model"
    );
}
