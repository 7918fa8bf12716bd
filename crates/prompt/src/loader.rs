//! Prompt loader: built-in definitions with optional YAML overrides.

use crate::types::PromptDefinition;
use ana_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Identifier of the answer-synthesis prompt.
pub const ANSWER_PROMPT_ID: &str = "rag.answer";

const ANSWER_SYSTEM: &str = "Eres un asistente agrícola experto. Si no tienes información \
suficiente, construye una respuesta basada en el contexto proporcionado y en tu conocimiento.";

const ANSWER_TEMPLATE: &str =
    "=== CONTEXTO ===\n{{context}}\n\n=== PREGUNTA ===\n{{question}}\n\n=== RESPUESTA ===";

/// Built-in answer-synthesis prompt.
pub fn answer_prompt() -> PromptDefinition {
    PromptDefinition {
        id: ANSWER_PROMPT_ID.to_string(),
        title: "Respuesta agrícola con contexto recuperado".to_string(),
        api_version: "1.0".to_string(),
        system: Some(ANSWER_SYSTEM.to_string()),
        template: ANSWER_TEMPLATE.to_string(),
    }
}

/// Prompt definitions compiled into the binary.
pub fn builtin_prompts() -> Vec<PromptDefinition> {
    vec![answer_prompt()]
}

/// Directory holding prompt overrides.
pub fn prompts_dir(workspace_path: &Path) -> PathBuf {
    workspace_path.join(".ana").join("prompts")
}

/// Load a prompt definition by ID.
///
/// Looks for `<id>.yml` in `.ana/prompts/` first and falls back to the
/// built-in definition with the same ID.
///
/// # Example
/// ```no_run
/// use ana_prompt::{load_prompt, ANSWER_PROMPT_ID};
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), ANSWER_PROMPT_ID)?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir(workspace_path).join(format!("{}.yml", prompt_id));

    if prompt_file.exists() {
        tracing::debug!("Loading prompt override from: {:?}", prompt_file);

        let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
            AppError::Prompt(format!(
                "Failed to read prompt file {:?}: {}",
                prompt_file, e
            ))
        })?;

        let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Prompt(format!(
                "Failed to parse prompt YAML {:?}: {}",
                prompt_file, e
            ))
        })?;

        validate_prompt(&definition)?;

        tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);
        return Ok(definition);
    }

    builtin_prompts()
        .into_iter()
        .find(|def| def.id == prompt_id)
        .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", prompt_id)))
}

/// List all available prompt IDs: built-ins plus workspace overrides.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<String>> {
    let mut prompt_ids: Vec<String> = builtin_prompts().into_iter().map(|def| def.id).collect();

    let dir = prompts_dir(workspace_path);
    if dir.exists() {
        for entry in walkdir::WalkDir::new(&dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if !prompt_ids.iter().any(|id| id == stem) {
                        prompt_ids.push(stem.to_string());
                    }
                }
            }
        }
    }

    prompt_ids.sort();
    Ok(prompt_ids)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.template.is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}
