//! Lexical relevance gate.
//!
//! Decides whether a query and its retrieved documents look like an
//! agricultural question backed by agricultural evidence.

use crate::types::Document;

/// Domain-indicator terms, matched case-insensitively as substrings.
pub const DOMAIN_TERMS: &[&str] = &[
    "producción",
    "cultivo",
    "café",
    "maíz",
    "flores",
    "banano",
    "cacao",
    "agricultura",
    "cosecha",
    "sequía",
    "plaga",
    "fertilizantes",
    "exportación",
    "rendimiento",
    "climáticas",
    "transporte",
    "bajó",
    "disminuyó",
    "afectada",
    "aumentó",
    "redujo",
    "condiciones",
    "bloqueos",
    "costo",
];

fn mentions_domain(text: &str) -> bool {
    let lower = text.to_lowercase();
    DOMAIN_TERMS.iter().any(|term| lower.contains(term))
}

/// True when the query and at least one retrieved document both mention a domain term.
pub fn has_sufficient_context(query: &str, retrieved: &[Document]) -> bool {
    if retrieved.is_empty() {
        return false;
    }

    mentions_domain(query) && retrieved.iter().any(|doc| mentions_domain(&doc.text))
}
