//! Quire Tree - Document Element Tree
//!
//! The mathematical document model consumed by every code generator:
//! - `ElementId` arena handles and the `ElementTree` that owns elements
//! - `ElementRef` read-only cursors for parent/child/sibling navigation
//! - `ElementKind` constants (precedence, associativity, typing rule)
//! - `Format` display parameters
//! - `ValueType` codes shared with plug-ins
//! - A compact textual notation for building trees
//!
//! # Design
//!
//! - **Flatten Everything**: children are `ElementId` indices, never boxes
//! - **Read-only during generation**: generators borrow the tree immutably
//! - **Kind over name**: precedence and typing live on the element kind,
//!   stamped in by the creator registered for the element type

mod element;
mod element_id;
mod format;
mod kind;
mod notation;
mod tree;
mod value_type;

pub use element::{Anchor, Children, Element};
pub use element_id::ElementId;
pub use format::{Format, ListStyle, ParenthesisStyle};
pub use kind::{
    Associativity, ChildPlacement, ElementKind, OperandPosition, Precedence, TypeRule,
};
pub use notation::{parse_notation, ElementFactory, NotationError};
pub use tree::{ElementRef, ElementTree, TreeError};
pub use value_type::ValueType;
