//! Generator configuration.

/// Options shared by every backend of one generation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Spaces per indentation level.
    pub indent: usize,
    /// Name of the native entry point wrapping the generated body.
    pub entry_point: String,
    /// LaTeX `\documentclass`.
    pub document_class: String,
    pub title: Option<String>,
    /// Wrap the body in the backend's document framing. When false, only
    /// the emitted sections are returned.
    pub standalone: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        GeneratorOptions {
            indent: 4,
            entry_point: "model_main".to_string(),
            document_class: "article".to_string(),
            title: None,
            standalone: true,
        }
    }
}

impl GeneratorOptions {
    /// Options that emit bare sections without framing.
    pub fn fragment() -> Self {
        GeneratorOptions {
            standalone: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
