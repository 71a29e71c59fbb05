//! Plug-in ABI and loader.
//!
//! A plug-in is a shared library exporting a [`PlugInDescriptor`] through
//! `quire_plug_in_descriptor`, and optionally `quire_plug_in_initialize`
//! and `quire_plug_in_destroy`. The descriptor carries metadata, function
//! definitions and runtime libraries as plain `#[repr(C)]` tables; the
//! initialize hook may register element types, translators and decoders
//! through a [`Registrar`](quire_codegen::Registrar).
//!
//! # Loading
//!
//! [`PlugInLoader`] drives every file through the same gates
//! (see [`LoadState`]). Registration is all-or-nothing per plug-in: a
//! failure at any gate leaves the registry exactly as it was before that
//! file, and the batch moves on.
//!
//! # Declarations
//!
//! Functions in customer-owned runtime libraries have no header in the
//! model API. The loader synthesizes native declarations for them and
//! stores them, compressed, as the library's declaration payload.

pub mod abi;
mod declarations;
mod error;
mod loader;
mod platform;
mod validate;

pub use abi::{PlugInDescriptor, RegistrarHandle, ABI_VERSION};
pub use declarations::synthesize as synthesize_declarations;
pub use error::PlugInError;
pub use loader::{search_path, FailureHook, FileStatus, LoadState, PlugInLoader, PLUGIN_PATH_VAR};
pub use platform::{Module, NativePlatform, Platform};
pub use validate::{PlugInInfo, DEFAULT_LICENSE};
