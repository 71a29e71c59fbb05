//! Built-in element kinds, decoders and backends.
//!
//! Registered through the same public registry API plug-ins use; nothing
//! here is special-cased by the engine.

mod html;
mod latex;
mod lists;
mod native;

use std::sync::Arc;

use quire_tree::{
    Associativity, ChildPlacement, Element, ElementKind, ElementRef, Precedence, TypeRule,
    ValueType,
};

use crate::decode;
use crate::registry::Registry;
use crate::translator::Translator;

pub use html::{HtmlBackend, HTML};
pub use latex::{LatexBackend, LATEX};
pub use lists::{list_position, ListKind, ListPosition};
pub use native::{mangle, native_parameter_type, native_type, NativeBackend, MODEL_HEADER, NATIVE};

const fn binary(precedence: Precedence, associativity: Associativity, rule: TypeRule) -> ElementKind {
    ElementKind::operator(2, precedence, associativity, rule)
}

const fn unary(precedence: Precedence, associativity: Associativity, rule: TypeRule) -> ElementKind {
    ElementKind::operator(1, precedence, associativity, rule)
}

const BOOLEAN: TypeRule = TypeRule::Fixed(ValueType::Boolean);

/// Every built-in element type and the kind its creator stamps in.
pub const ELEMENT_KINDS: &[(&str, ElementKind)] = &[
    ("Root", ElementKind::group()),
    ("Paragraph", ElementKind::group()),
    ("Frame", ElementKind::group().with_placement(ChildPlacement::Floating)),
    ("Text", ElementKind::leaf(ValueType::None)),
    ("Literal", ElementKind::leaf(ValueType::None)),
    ("Variable", ElementKind::leaf(ValueType::None)),
    (
        "Assignment",
        binary(Precedence::ASSIGNMENT, Associativity::Right, TypeRule::Promote),
    ),
    (
        "Addition",
        binary(Precedence::ADDITION, Associativity::Both, TypeRule::Promote),
    ),
    (
        "Subtraction",
        binary(Precedence::ADDITION, Associativity::Left, TypeRule::Promote),
    ),
    (
        "Multiplication",
        binary(Precedence::MULTIPLICATION, Associativity::Both, TypeRule::Promote),
    ),
    (
        "Division",
        binary(
            Precedence::MULTIPLICATION,
            Associativity::Left,
            TypeRule::PromoteAtLeastReal,
        ),
    ),
    (
        "Power",
        binary(Precedence::POWER, Associativity::Right, TypeRule::Promote),
    ),
    (
        "Negation",
        unary(Precedence::UNARY_MINUS, Associativity::Right, TypeRule::FirstChild),
    ),
    (
        "Factorial",
        unary(Precedence::POSTFIX, Associativity::Left, TypeRule::FirstChild),
    ),
    (
        "Parenthesis",
        unary(Precedence::GROUPING, Associativity::Both, TypeRule::FirstChild),
    ),
    (
        "AbsoluteValue",
        unary(Precedence::GROUPING, Associativity::Both, TypeRule::FirstChild),
    ),
    ("LessThan", binary(Precedence::RELATIONAL, Associativity::None, BOOLEAN)),
    ("GreaterThan", binary(Precedence::RELATIONAL, Associativity::None, BOOLEAN)),
    ("LessOrEqual", binary(Precedence::RELATIONAL, Associativity::None, BOOLEAN)),
    ("GreaterOrEqual", binary(Precedence::RELATIONAL, Associativity::None, BOOLEAN)),
    ("Equal", binary(Precedence::RELATIONAL, Associativity::None, BOOLEAN)),
    ("NotEqual", binary(Precedence::RELATIONAL, Associativity::None, BOOLEAN)),
    ("LogicalAnd", binary(Precedence::LOGICAL_AND, Associativity::Both, BOOLEAN)),
    ("LogicalOr", binary(Precedence::LOGICAL_OR, Associativity::Both, BOOLEAN)),
    ("LogicalNot", unary(Precedence::LOGICAL_NOT, Associativity::Right, BOOLEAN)),
    (
        "FunctionCall",
        ElementKind {
            precedence: Precedence::FUNCTION,
            type_rule: TypeRule::Declared,
            ..ElementKind::group()
        },
    ),
    (
        "Matrix",
        ElementKind {
            type_rule: TypeRule::MatrixOfChildren,
            ..ElementKind::group().with_placement(ChildPlacement::Grid)
        },
    ),
];

/// Populate `registry` with every built-in.
pub(crate) fn register(registry: &mut Registry) {
    for &(type_name, kind) in ELEMENT_KINDS {
        registry.register_element_creator(
            type_name,
            Arc::new(move || Element::new(type_name, kind)),
            false,
        );
    }

    registry.register_decoder(ValueType::Boolean, &decode::BOOLEAN);
    registry.register_decoder(ValueType::Integer, &decode::INTEGER);
    registry.register_decoder(ValueType::Real, &decode::REAL);
    registry.register_decoder(ValueType::Complex, &decode::COMPLEX);

    registry.register_backend(Arc::new(NativeBackend));
    registry.register_backend(Arc::new(HtmlBackend));
    registry.register_backend(Arc::new(LatexBackend));

    register_translators(registry, NATIVE, native::TRANSLATORS);
    register_translators(registry, HTML, html::TRANSLATORS);
    register_translators(registry, LATEX, latex::TRANSLATORS);

    tracing::debug!(?registry, "built-ins registered");
}

fn register_translators(
    registry: &mut Registry,
    backend: &str,
    translators: &[(&str, &'static dyn Translator)],
) {
    for &(type_name, translator) in translators {
        registry.register_translator(backend, type_name, translator, false);
    }
}

/// Structural containers (`Root`, `Paragraph`, `Frame`): elements that
/// hold document content rather than evaluate to a value.
pub fn is_block(element: ElementRef<'_>) -> bool {
    element.element().type_rule() == TypeRule::Fixed(ValueType::None)
}

/// Prose leaves.
pub fn is_text(element: ElementRef<'_>) -> bool {
    element.type_name() == "Text"
}
