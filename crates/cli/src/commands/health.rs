//! Health command handler.
//!
//! Loads the resources the server would load and reports which succeeded.

use ana_core::{config::AppConfig, AppResult};
use ana_knowledge::{ResourceReport, Resources};
use clap::Args;
use serde_json::{json, Value};

/// Check which resources load
#[derive(Args, Debug)]
pub struct HealthCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl HealthCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing health command");

        let resources = Resources::load(config).await?;
        let report = resources.report(&config.index_path());
        let prompts = ana_prompt::list_prompts(&config.workspace)?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&health_json(&report, &prompts))?
            );
        } else {
            println!("Resources for {:?}", config.workspace);
            println!("  vector_index: {}", report.status.vector_index);
            match report.index.size_bytes {
                Some(size) => println!("    file:      {:?} ({} bytes)", report.index.path, size),
                None => println!("    file:      {:?} (missing)", report.index.path),
            }
            let index = &report.index;
            if let (Some(vectors), Some(dimension)) = (index.vectors, index.dimension) {
                println!("    vectors:   {} (dimension {})", vectors, dimension);
            }
            println!("  docs:         {} ({} documents)", report.status.docs, report.documents);
            println!("  embedder:     {}", report.status.embedder);
            println!("  data:         {}", report.status.data);
            if let Some(data) = &report.data {
                println!("    rows:      {} ({})", data.rows, data.columns.join(", "));
            }
            println!("  prompts:      {}", prompts.join(", "));
        }

        Ok(())
    }
}

fn health_json(report: &ResourceReport, prompts: &[String]) -> Value {
    json!({
        "status": "healthy",
        "resources_loaded": report.status,
        "documents": report.documents,
        "index": report.index,
        "data": report.data,
        "prompts": prompts,
    })
}
