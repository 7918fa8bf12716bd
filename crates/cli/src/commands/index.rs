//! Index command handler.
//!
//! Builds the vector index and document store offline.

use ana_core::{config::AppConfig, AppResult};
use ana_knowledge::{build_index, create_embedder, Resources, Retrieval, Retriever, DEFAULT_TOP_K};
use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

/// Vector index management
#[derive(Args, Debug)]
pub struct IndexCommand {
    #[command(subcommand)]
    pub action: IndexAction,
}

#[derive(Subcommand, Debug)]
pub enum IndexAction {
    /// Build the index from a .csv (column "analisis") or .txt file
    Build(IndexBuildCommand),

    /// Show the documents retrieved for a query, without calling the model
    Search(IndexSearchCommand),
}

/// Build the index
#[derive(Args, Debug)]
pub struct IndexBuildCommand {
    /// Input file with the analyses
    pub input: PathBuf,

    /// Replace an existing index
    #[arg(long)]
    pub reset: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Query the index
#[derive(Args, Debug)]
pub struct IndexSearchCommand {
    /// Query text
    pub query: String,

    /// Number of documents to retrieve
    #[arg(short, long, default_value_t = DEFAULT_TOP_K)]
    pub k: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IndexCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.action {
            IndexAction::Build(cmd) => cmd.execute(config).await,
            IndexAction::Search(cmd) => cmd.execute(config).await,
        }
    }
}

impl IndexBuildCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing index build command for {:?}", self.input);

        let input = config.resolve(&self.input);
        let embedder = create_embedder(&config.embedding).await?;
        let stats = build_index(config, &input, embedder.as_ref(), self.reset).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!(
                "Indexed {} documents (dimension {}) in {:.2}s",
                stats.documents, stats.dimension, stats.duration_secs
            );
            println!("  index: {:?}", config.index_path());
            println!("  docs:  {:?}", config.docs_path());
        }

        Ok(())
    }
}

impl IndexSearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing index search command (k={})", self.k);

        let resources = Arc::new(Resources::load(config).await?);
        let retrieval = Retriever::new(resources).retrieve_detailed(&self.query, self.k).await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&search_json(&retrieval))?);
        } else {
            if retrieval.mode.is_degraded() {
                println!("Random sample (ranked search unavailable)");
            }
            for doc in &retrieval.documents {
                println!("[{}] {}", doc.position, doc.text);
            }
        }

        Ok(())
    }
}

fn search_json(retrieval: &Retrieval) -> serde_json::Value {
    serde_json::json!({
        "retrieval": retrieval.mode,
        "documents": retrieval.documents,
    })
}
