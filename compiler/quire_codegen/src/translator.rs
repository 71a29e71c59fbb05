//! The per-element translation interface.

use quire_tree::ElementRef;

use crate::context::{DependencyContext, EmitContext};
use crate::error::GenerationError;

/// Output pass of a generation run, in the order a backend lists them.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum EmitPhase {
    /// File-scope declarations, before the body.
    Declarations,
    /// The document body.
    Body,
}

/// Emits one backend's representation of one element type.
///
/// Translators are registered as `&'static` references and shared by every
/// engine; they keep no per-run state. Children are reached by calling back
/// into [`EmitContext::translate`].
pub trait Translator: Send + Sync {
    /// Record the resources this element needs. Runs once per element
    /// before any output is produced and must not write output.
    fn identify_dependencies(
        &self,
        _element: ElementRef<'_>,
        _deps: &mut DependencyContext<'_>,
    ) -> Result<(), GenerationError> {
        Ok(())
    }

    /// Emit the element during [`EmitPhase::Body`].
    fn translate(
        &self,
        element: ElementRef<'_>,
        ctx: &mut EmitContext<'_>,
    ) -> Result<(), GenerationError>;

    /// Emit the element during [`EmitPhase::Declarations`]. Most elements
    /// declare nothing themselves and only pass through to their children.
    fn declare(
        &self,
        element: ElementRef<'_>,
        ctx: &mut EmitContext<'_>,
    ) -> Result<(), GenerationError> {
        ctx.translate_children(element)
    }
}
