//! Reasons a plug-in file fails to load.

use std::path::PathBuf;

/// Why one plug-in was skipped. The batch continues with the next file.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlugInError {
    #[error("cannot open '{}': {reason}", path.display())]
    Open { path: PathBuf, reason: String },

    #[error("'{}' does not export a plug-in descriptor", .0.display())]
    MissingDescriptor(PathBuf),

    #[error("plug-in ABI version {found} is not supported (expected {expected})")]
    AbiMismatch { expected: u32, found: u32 },

    #[error("plug-in descriptor has no {0}")]
    MissingMetadata(&'static str),

    #[error("plug-in {0} is not valid UTF-8")]
    InvalidText(&'static str),

    #[error("a plug-in named '{0}' is already loaded")]
    DuplicateName(String),

    #[error("function definition {index} is invalid: {reason}")]
    InvalidFunction { index: usize, reason: String },

    #[error("runtime library definition {index} is invalid: {reason}")]
    InvalidLibrary { index: usize, reason: String },

    #[error("{what} '{key}' conflicts with an existing registration")]
    Conflict { what: &'static str, key: String },

    #[error("plug-in '{0}' reported an initialization failure")]
    InitializationFailed(String),

    #[error("declarations for library '{0}' are already registered")]
    DeclarationConflict(String),
}
