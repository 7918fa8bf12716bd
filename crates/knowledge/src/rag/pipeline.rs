//! End-to-end answer pipeline: retrieve, build context, generate, normalize.

use crate::rag::gate::has_sufficient_context;
use crate::rag::generator::Generator;
use crate::rag::retriever::Retriever;
use crate::rag::types::{PipelineOutcome, NO_INFO_MARKER, NO_INFO_PHRASE, REFUSAL};
use crate::resources::Resources;
use crate::types::{AnswerRequest, AnswerResponse, Document, ResourceStatus};
use ana_core::{AppError, AppResult};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Number of documents the pipeline retrieves per question.
pub const PIPELINE_TOP_K: usize = 5;

/// Message for a blank question.
pub const EMPTY_QUESTION_MESSAGE: &str = "La pregunta no puede estar vacía";

/// Message accompanying a successful answer.
pub const SUCCESS_MESSAGE: &str = "Respuesta generada exitosamente";

/// Join retrieved documents into the context block, one bullet per document.
pub fn build_context(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|doc| format!("- {}", doc.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replace answers that admit missing information with the canonical refusal.
pub fn normalize_answer(text: &str) -> String {
    let text = text.trim();
    if text.to_uppercase().starts_with(NO_INFO_MARKER)
        || text.to_lowercase().contains(NO_INFO_PHRASE)
    {
        REFUSAL.to_string()
    } else {
        text.to_string()
    }
}

/// The answer pipeline over a set of loaded resources.
pub struct AnaRag {
    resources: Arc<Resources>,
    retriever: Retriever,
    generator: Generator,
    top_k: usize,
}

impl AnaRag {
    pub fn new(resources: Arc<Resources>, generator: Generator) -> Self {
        Self {
            retriever: Retriever::new(resources.clone()),
            resources,
            generator,
            top_k: PIPELINE_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn resource_status(&self) -> ResourceStatus {
        self.resources.status()
    }

    /// Answer a question.
    pub async fn answer(&self, query: &str) -> AppResult<String> {
        Ok(self.answer_detailed(query).await?.answer)
    }

    /// Answer a question and report how the answer was obtained.
    ///
    /// Anything escaping retrieval or generation is returned as a pipeline error.
    pub async fn answer_detailed(&self, query: &str) -> AppResult<PipelineOutcome> {
        AssertUnwindSafe(self.run(query))
            .catch_unwind()
            .await
            .map_err(|panic| AppError::Pipeline(panic_message(panic)))
    }

    async fn run(&self, query: &str) -> PipelineOutcome {
        let retrieval = self.retriever.retrieve_detailed(query, self.top_k).await;

        let sufficient_context = has_sufficient_context(query, &retrieval.documents);
        tracing::info!(
            documents = retrieval.documents.len(),
            degraded = retrieval.mode.is_degraded(),
            sufficient_context,
            "Retrieved context"
        );

        let context = build_context(&retrieval.documents);
        let outcome = self.generator.generate_outcome(query, &context).await;
        let strategy = outcome.strategy();
        let answer = normalize_answer(&outcome.into_text());

        PipelineOutcome {
            answer,
            retrieval_mode: retrieval.mode,
            sufficient_context,
            strategy,
        }
    }

    /// Handle one request: validate the question, run the pipeline, build the response.
    pub async fn ask(&self, request: &AnswerRequest) -> AnswerResponse {
        if request.question.trim().is_empty() {
            return AnswerResponse::failure(EMPTY_QUESTION_MESSAGE);
        }

        match self.answer(&request.question).await {
            Ok(answer) => AnswerResponse::success(answer, SUCCESS_MESSAGE),
            Err(e) => {
                tracing::error!("Pipeline failed: {}", e);
                AnswerResponse::failure(format!("Error procesando la pregunta: {}", e))
            }
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unexpected failure".to_string()
    }
}
