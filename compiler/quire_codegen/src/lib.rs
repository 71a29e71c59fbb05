//! Quire Codegen - Retargetable Code Generation
//!
//! Translates an [`ElementTree`](quire_tree::ElementTree) into native C++,
//! HTML with MathML, or LaTeX, and into any backend a plug-in registers.
//!
//! # Architecture
//!
//! - [`Registry`]: creators, translators, decoders, functions, payloads,
//!   runtime libraries and backends, populated at load time and then
//!   frozen into a [`SharedRegistry`]
//! - [`Registrar`]: staged registration on behalf of one plug-in
//! - [`operators`]: precedence-aware grouping and value-type promotion
//!   shared by every backend
//! - [`Engine`]: dependency identification, backend emit phases, assembly
//!
//! # Design
//!
//! - **Registry is explicit**: no process-wide tables; whoever builds the
//!   registry owns it
//! - **Translators are stateless**: all per-run state lives in
//!   [`EmitContext`]
//! - **Fail whole**: a backend run either produces a complete document or
//!   one [`GenerationError`]

mod backend;
pub mod builtins;
mod context;
pub mod decode;
mod engine;
mod error;
pub mod operators;
mod options;
pub mod registry;
mod resources;
mod shared;
mod translator;

pub use backend::{Assembly, Backend, Sections};
pub use context::{DependencyContext, EmitContext};
pub use decode::{DecodeError, Decoder, PLACEHOLDER};
pub use engine::{generate_all, Engine, GeneratedOutput};
pub use error::GenerationError;
pub use options::GeneratorOptions;
pub use registry::{
    ElementCreator, FunctionRecord, FunctionVariant, LibraryDependency, LibraryKind,
    LibraryOwner, Parameter, Registrar, Registry, RuntimeLibrary,
};
pub use resources::{Resource, ResourceKind, ResourceSet};
pub use shared::SharedRegistry;
pub use translator::{EmitPhase, Translator};
