//! Generation failures.
//!
//! A single error aborts one backend's run. Registration conflicts are not
//! errors; registry methods report them as `false`.

use quire_tree::{ElementId, ElementRef};

/// Why a backend's generation run was aborted.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("no backend named '{0}' is registered")]
    UnknownBackend(String),

    #[error("no {backend} translator is registered for element '{element_type}' ({element})")]
    MissingTranslator {
        backend: String,
        element_type: String,
        element: ElementId,
    },

    #[error("{backend} translation of '{element_type}' ({element}) failed: {reason}")]
    TranslatorFailed {
        backend: String,
        element_type: String,
        element: ElementId,
        reason: String,
    },

    #[error("element {0} is not part of the document")]
    InvalidElement(ElementId),
}

impl GenerationError {
    pub fn missing_translator(backend: &str, element: ElementRef<'_>) -> Self {
        GenerationError::MissingTranslator {
            backend: backend.to_string(),
            element_type: element.type_name().to_string(),
            element: element.id(),
        }
    }

    pub fn failed(backend: &str, element: ElementRef<'_>, reason: impl Into<String>) -> Self {
        GenerationError::TranslatorFailed {
            backend: backend.to_string(),
            element_type: element.type_name().to_string(),
            element: element.id(),
            reason: reason.into(),
        }
    }

    /// Type name of the offending element, when there is one.
    pub fn element_type(&self) -> Option<&str> {
        match self {
            GenerationError::MissingTranslator { element_type, .. }
            | GenerationError::TranslatorFailed { element_type, .. } => Some(element_type),
            GenerationError::UnknownBackend(_) | GenerationError::InvalidElement(_) => None,
        }
    }
}
