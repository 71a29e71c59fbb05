//! Multi-phase generation engine.
//!
//! # Architecture
//!
//! ```text
//! ElementTree + SharedRegistry
//!        ↓
//!   dependency identification   (every element: translator present? resources?)
//!        ↓
//!   emit phases                 (backend-defined, e.g. Declarations then Body)
//!        ↓
//!   Backend::assemble           (framing, includes, packages, link order)
//!        ↓
//!   GeneratedOutput
//! ```
//!
//! Any missing translator or translator failure aborts the run for that
//! backend with one [`GenerationError`]; no partial output is returned.

use std::sync::Arc;

use rayon::prelude::*;

use quire_stack::ensure_sufficient_stack;
use quire_tree::{ElementRef, ElementTree};

use crate::backend::{Assembly, Backend, Sections};
use crate::context::{DependencyContext, EmitContext};
use crate::error::GenerationError;
use crate::options::GeneratorOptions;
use crate::registry::Registry;
use crate::resources::{ResourceKind, ResourceSet};
use crate::SharedRegistry;

/// Result of one successful backend run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedOutput {
    pub backend: String,
    /// The assembled document (or the bare sections when not standalone).
    pub text: String,
    pub sections: Sections,
    pub resources: ResourceSet,
    /// Libraries to link, each before its dependencies.
    pub link_order: Vec<String>,
}

/// Generator for one backend.
pub struct Engine {
    registry: SharedRegistry<Registry>,
    backend: Arc<dyn Backend>,
    options: GeneratorOptions,
}

impl Engine {
    pub fn new(
        registry: SharedRegistry<Registry>,
        backend: &str,
        options: GeneratorOptions,
    ) -> Result<Self, GenerationError> {
        let backend = registry
            .backend(backend)
            .ok_or_else(|| GenerationError::UnknownBackend(backend.to_string()))?;
        Ok(Engine {
            registry,
            backend,
            options,
        })
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Translate `tree` from its root.
    #[tracing::instrument(level = "debug", skip_all, fields(backend = self.backend.name()))]
    pub fn generate(&self, tree: &ElementTree) -> Result<GeneratedOutput, GenerationError> {
        let root = tree
            .root_cursor()
            .ok_or(GenerationError::InvalidElement(tree.root()))?;
        let registry: &Registry = &self.registry;
        let name = self.backend.name();

        let mut resources = ResourceSet::new();
        self.backend.base_resources(&mut resources);
        {
            let mut deps = DependencyContext::new(registry, name, &mut resources);
            identify_dependencies(root, &mut deps)?;
        }
        tracing::debug!(resources = resources.len(), "dependencies identified");

        let link_order = registry.link_order(resources.names(ResourceKind::Library));

        let mut sections = Sections::new();
        let mut ctx = EmitContext::new(registry, name, &self.options, &resources);
        for &phase in self.backend.emit_phases() {
            ctx.begin_phase(phase);
            ctx.translate(root)?;
            let text = ctx.take_output();
            tracing::debug!(?phase, bytes = text.len(), "phase emitted");
            sections.insert(phase, text);
        }
        drop(ctx);

        let text = if self.options.standalone {
            self.backend.assemble(&Assembly {
                sections: &sections,
                resources: &resources,
                link_order: &link_order,
                options: &self.options,
            })
        } else {
            sections.values().map(String::as_str).collect()
        };

        Ok(GeneratedOutput {
            backend: name.to_string(),
            text,
            sections,
            resources,
            link_order,
        })
    }
}

/// Visit every element once: fail on the first element without a
/// translator, otherwise collect resources.
fn identify_dependencies(
    element: ElementRef<'_>,
    deps: &mut DependencyContext<'_>,
) -> Result<(), GenerationError> {
    ensure_sufficient_stack(|| {
        let translator = deps
            .registry()
            .translator(deps.backend(), element.type_name())
            .ok_or_else(|| GenerationError::missing_translator(deps.backend(), element))?;
        translator.identify_dependencies(element, deps)?;
        for child in element.children() {
            identify_dependencies(child, deps)?;
        }
        Ok(())
    })
}

/// Generate `tree` for every registered backend in parallel. Each
/// backend's result is independent of the others.
pub fn generate_all(
    registry: &SharedRegistry<Registry>,
    tree: &ElementTree,
    options: &GeneratorOptions,
) -> Vec<(String, Result<GeneratedOutput, GenerationError>)> {
    let names: Vec<String> = registry
        .backend_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    names
        .into_par_iter()
        .map(|name| {
            let result = Engine::new(registry.clone(), &name, options.clone())
                .and_then(|engine| engine.generate(tree));
            if let Err(error) = &result {
                tracing::warn!(backend = %name, %error, "generation failed");
            }
            (name, result)
        })
        .collect()
}

#[cfg(test)]
mod tests;
