//! Per-run generation state.
//!
//! [`DependencyContext`] is handed to translators during dependency
//! identification and can only record resources. [`EmitContext`] carries
//! the output buffer for one emit phase, plus the indentation and the
//! declared-name set, which outlive a single element.

use rustc_hash::FxHashSet;

use quire_stack::ensure_sufficient_stack;
use quire_tree::{ElementRef, ValueType};

use crate::decode::PLACEHOLDER;
use crate::error::GenerationError;
use crate::operators::infer_value_type;
use crate::options::GeneratorOptions;
use crate::registry::Registry;
use crate::resources::{ResourceKind, ResourceSet};
use crate::translator::EmitPhase;

/// Resource discovery for one backend.
pub struct DependencyContext<'a> {
    registry: &'a Registry,
    backend: &'a str,
    resources: &'a mut ResourceSet,
}

impl<'a> DependencyContext<'a> {
    pub fn new(registry: &'a Registry, backend: &'a str, resources: &'a mut ResourceSet) -> Self {
        DependencyContext {
            registry,
            backend,
            resources,
        }
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn backend(&self) -> &'a str {
        self.backend
    }

    /// Idempotent.
    pub fn require(&mut self, kind: ResourceKind, name: impl Into<String>) {
        self.resources.insert(kind, name);
    }

    pub fn resources(&self) -> &ResourceSet {
        self.resources
    }

    pub fn failure(&self, element: ElementRef<'_>, reason: impl Into<String>) -> GenerationError {
        GenerationError::failed(self.backend, element, reason)
    }
}

/// Output state of one emit phase.
pub struct EmitContext<'a> {
    registry: &'a Registry,
    backend: &'a str,
    options: &'a GeneratorOptions,
    resources: &'a ResourceSet,
    phase: EmitPhase,
    /// Current indentation level.
    indent: usize,
    output: String,
    /// Names already declared, to avoid duplicate declarations.
    declared: FxHashSet<String>,
}

impl<'a> EmitContext<'a> {
    pub fn new(
        registry: &'a Registry,
        backend: &'a str,
        options: &'a GeneratorOptions,
        resources: &'a ResourceSet,
    ) -> Self {
        EmitContext {
            registry,
            backend,
            options,
            resources,
            phase: EmitPhase::Body,
            indent: 0,
            output: String::with_capacity(4096),
            declared: FxHashSet::default(),
        }
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn backend(&self) -> &'a str {
        self.backend
    }

    pub fn options(&self) -> &'a GeneratorOptions {
        self.options
    }

    /// Resources discovered before emission began.
    pub fn resources(&self) -> &'a ResourceSet {
        self.resources
    }

    pub fn phase(&self) -> EmitPhase {
        self.phase
    }

    /// Start a new phase with an empty buffer and indentation reset.
    /// Declared names carry over.
    pub fn begin_phase(&mut self, phase: EmitPhase) {
        self.phase = phase;
        self.indent = 0;
        self.output.clear();
    }

    /// Dispatch `element` to its translator for the current phase.
    pub fn translate(&mut self, element: ElementRef<'_>) -> Result<(), GenerationError> {
        ensure_sufficient_stack(|| {
            let translator = self
                .registry
                .translator(self.backend, element.type_name())
                .ok_or_else(|| GenerationError::missing_translator(self.backend, element))?;
            tracing::trace!(?element, phase = ?self.phase, "translate");
            match self.phase {
                EmitPhase::Body => translator.translate(element, self),
                EmitPhase::Declarations => translator.declare(element, self),
            }
        })
    }

    /// Translate every set child, in order.
    pub fn translate_children(&mut self, element: ElementRef<'_>) -> Result<(), GenerationError> {
        for child in element.children() {
            self.translate(child)?;
        }
        Ok(())
    }

    /// Run `emit` against a detached buffer and return what it wrote.
    pub fn capture(
        &mut self,
        emit: impl FnOnce(&mut Self) -> Result<(), GenerationError>,
    ) -> Result<String, GenerationError> {
        let saved = std::mem::take(&mut self.output);
        let result = emit(self);
        let captured = std::mem::replace(&mut self.output, saved);
        result.map(|()| captured)
    }

    /// Child in operand slot `index`, or a failure naming the gap.
    pub fn operand<'t>(
        &self,
        element: ElementRef<'t>,
        index: usize,
    ) -> Result<ElementRef<'t>, GenerationError> {
        element
            .child(index)
            .ok_or_else(|| self.failure(element, format!("operand {index} is missing")))
    }

    pub fn failure(&self, element: ElementRef<'_>, reason: impl Into<String>) -> GenerationError {
        GenerationError::failed(self.backend, element, reason)
    }

    /// Display text for a literal through the registered decoder. A
    /// missing decoder or a malformed value yields [`PLACEHOLDER`].
    pub fn decode(&self, element: ElementRef<'_>) -> String {
        let value_type = element.element().declared_type();
        let raw = element.text().unwrap_or_default();
        let Some(decoder) = self.registry.decoder(value_type) else {
            tracing::warn!(?element, %value_type, "no decoder registered");
            return PLACEHOLDER.to_string();
        };
        match decoder.decode(raw, element.format()) {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!(?element, %error, "value rendered as placeholder");
                PLACEHOLDER.to_string()
            }
        }
    }

    /// Value type of `element` under the shared promotion rules.
    pub fn value_type(&self, element: ElementRef<'_>) -> ValueType {
        infer_value_type(element)
    }

    /// Record `name` as declared. Returns false if it already was.
    pub fn mark_declared(&mut self, name: impl Into<String>) -> bool {
        self.declared.insert(name.into())
    }

    /// Nest subsequent lines one level deeper.
    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Write the current indentation.
    pub fn write_indent(&mut self) {
        let width = self.indent * self.options.indent;
        self.output.extend(std::iter::repeat(' ').take(width));
    }

    pub fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    /// Write `s` as one indented line.
    pub fn writeln(&mut self, s: &str) {
        self.write_indent();
        self.output.push_str(s);
        self.output.push('\n');
    }

    pub fn newline(&mut self) {
        self.output.push('\n');
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}
