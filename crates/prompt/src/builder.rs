//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use ana_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// Renders the user template with Handlebars and carries the definition's
/// system instruction through unchanged.
///
/// # Example
/// ```no_run
/// use ana_prompt::{build_prompt, PromptDefinition};
/// use std::collections::HashMap;
///
/// # fn example(def: PromptDefinition) -> Result<(), Box<dyn std::error::Error>> {
/// let mut vars = HashMap::new();
/// vars.insert("question".to_string(), "¿Por qué bajó el café?".to_string());
/// vars.insert("context".to_string(), "- Sequía en 2023".to_string());
///
/// let built = build_prompt(&def, vars)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let user = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt::new(
        definition.system.clone(),
        user,
        definition.id.clone(),
        variables,
    ))
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Disable HTML escaping for plain text
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::builtin_prompts;

    fn vars(question: &str, context: &str) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("context".to_string(), context.to_string());
        vars
    }

    #[test]
    fn test_render_simple_template() {
        let result = render_template("Pregunta: {{question}}", &vars("¿Qué pasó?", ""));
        assert_eq!(result.unwrap(), "Pregunta: ¿Qué pasó?");
    }

    #[test]
    fn test_render_does_not_escape() {
        let result = render_template("{{context}}", &vars("", "<b>maíz & café</b>"));
        assert_eq!(result.unwrap(), "<b>maíz & café</b>");
    }

    #[test]
    fn test_build_answer_prompt() {
        let def = builtin_prompts().remove(0);
        let built = build_prompt(
            &def,
            vars("¿Cómo afectaron las lluvias al banano?", "- Lluvias en banano"),
        )
        .unwrap();

        assert_eq!(
            built.user,
            "=== CONTEXTO ===\n- Lluvias en banano\n\n=== PREGUNTA ===\n¿Cómo afectaron las lluvias al banano?\n\n=== RESPUESTA ==="
        );
        assert!(built.system.is_some());
        assert_eq!(built.metadata.source_prompt_id, "rag.answer");
    }

    #[test]
    fn test_render_template_missing_variable() {
        let result = render_template("Pregunta: {{missing}}", &HashMap::new());
        // Handlebars renders missing variables as empty string
        assert_eq!(result.unwrap(), "Pregunta: ");
    }

    #[test]
    fn test_invalid_template() {
        assert!(render_template("{{#if}}", &HashMap::new()).is_err());
    }
}
