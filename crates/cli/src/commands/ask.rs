//! Ask command handler.
//!
//! Runs one question through the answer pipeline.

use super::build_pipeline;
use ana_core::{config::AppConfig, AppResult};
use ana_knowledge::{rag::PIPELINE_TOP_K, AnswerRequest};
use clap::Args;

/// Ask a question about agricultural production
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Number of documents to retrieve
    #[arg(short = 'k', long, default_value_t = PIPELINE_TOP_K)]
    pub top_k: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let rag = build_pipeline(config).await?.with_top_k(self.top_k);

        if self.json {
            let response = rag.ask(&AnswerRequest::new(self.question.clone())).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
            return Ok(());
        }

        if self.question.trim().is_empty() {
            return Err(ana_core::AppError::Config(
                "La pregunta no puede estar vacía".to_string(),
            ));
        }

        let outcome = rag.answer_detailed(&self.question).await?;
        tracing::debug!(
            retrieval = ?outcome.retrieval_mode,
            strategy = ?outcome.strategy,
            sufficient_context = outcome.sufficient_context,
            "Answer produced"
        );

        println!("{}", outcome.answer);
        Ok(())
    }
}
