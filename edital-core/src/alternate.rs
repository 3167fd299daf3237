//! Alternate extraction path.
//!
//! An external service (typically a language model behind an API) can stand
//! in for the pattern rules. It produces the same [`FieldMap`] shape, but no
//! evidence, so its attributions carry the value itself and no section. Any
//! failure sends the pipeline back to the pattern rules.

use crate::types::{FieldMap, SourceAttribution};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlternateError {
    #[error("alternate extractor unavailable: {0}")]
    Unavailable(String),

    #[error("alternate extractor quota exceeded")]
    QuotaExceeded,

    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    #[error("alternate extraction failed: {0}")]
    Failed(String),
}

impl AlternateError {
    /// Warning shown to the user next to a pattern-based result.
    pub fn warning_message(&self) -> String {
        const FALLBACK: &str = "O sistema usou extração baseada em padrões como alternativa.";
        match self {
            AlternateError::QuotaExceeded => format!(
                "A extração alternativa falhou porque a cota do serviço foi esgotada. {FALLBACK}"
            ),
            AlternateError::MissingCredentials(variable) => format!(
                "A extração alternativa falhou porque a credencial {variable} não está configurada. {FALLBACK}"
            ),
            AlternateError::Unavailable(_) | AlternateError::Failed(_) => {
                format!("A extração alternativa falhou. {FALLBACK}")
            }
        }
    }
}

pub trait AlternateExtractor: Send + Sync {
    fn name(&self) -> &str;
    fn extract(&self, text: &str) -> Result<FieldMap, AlternateError>;
}

/// One attribution per field, with the value standing in for the evidence.
pub fn value_attributions(fields: &FieldMap) -> Vec<SourceAttribution> {
    fields
        .iter()
        .map(|(field, value)| SourceAttribution {
            field,
            snippet: value.to_string(),
            context: value.to_string(),
            section_number: None,
            section_title: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Field;

    #[test]
    fn test_warning_messages_name_the_cause() {
        assert!(AlternateError::QuotaExceeded.warning_message().contains("cota"));
        assert!(AlternateError::MissingCredentials("API_KEY".into())
            .warning_message()
            .contains("API_KEY"));
        assert!(AlternateError::Failed("timeout".into())
            .warning_message()
            .ends_with("como alternativa."));
    }

    #[test]
    fn test_value_attributions() {
        let mut fields = FieldMap::new();
        fields.set(Field::ModoDisputa, "aberto");
        fields.set(Field::PncpPrazo, "8");

        let sources = value_attributions(&fields);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].field, Field::ModoDisputa);
        assert_eq!(sources[0].snippet, "aberto");
        assert_eq!(sources[0].context, "aberto");
        assert!(sources.iter().all(|s| s.section_number.is_none()));
    }
}
