//! Algebraic type promotion.
//!
//! Computed once, independent of any backend: a fixed table indexed by two
//! operand value types. Backends only ever read the result.

use quire_stack::ensure_sufficient_stack;
use quire_tree::{ElementRef, TypeRule, ValueType};

type Table = [[ValueType; ValueType::COUNT]; ValueType::COUNT];

/// Result of combining two operand types.
pub static PROMOTION: Table = build_table();

/// Look up the promoted type of `a` combined with `b`.
#[inline]
pub fn promote(a: ValueType, b: ValueType) -> ValueType {
    PROMOTION[a.index()][b.index()]
}

/// Rank of a scalar in the widening order boolean < integer < real <
/// complex.
const fn scalar_rank(t: ValueType) -> usize {
    match t {
        ValueType::Boolean => 0,
        ValueType::Integer => 1,
        ValueType::Real => 2,
        _ => 3,
    }
}

const fn wider_scalar(a: ValueType, b: ValueType) -> ValueType {
    if scalar_rank(a) >= scalar_rank(b) {
        a
    } else {
        b
    }
}

const fn combine(a: ValueType, b: ValueType) -> ValueType {
    match (a, b) {
        (ValueType::None, other) | (other, ValueType::None) => other,
        (ValueType::Variant, _) | (_, ValueType::Variant) => ValueType::Variant,
        (ValueType::Set, ValueType::Set) => ValueType::Set,
        (ValueType::Tuple, ValueType::Tuple) => ValueType::Tuple,
        (ValueType::Set | ValueType::Tuple, _) | (_, ValueType::Set | ValueType::Tuple) => {
            ValueType::Variant
        }
        _ => {
            let scalar = wider_scalar(a.scalar_of(), b.scalar_of());
            if a.is_matrix() || b.is_matrix() {
                scalar.matrix_of()
            } else {
                scalar
            }
        }
    }
}

const fn build_table() -> Table {
    let mut table = [[ValueType::None; ValueType::COUNT]; ValueType::COUNT];
    let mut i = 0;
    while i < ValueType::COUNT {
        let mut j = 0;
        while j < ValueType::COUNT {
            table[i][j] = combine(ValueType::ALL[i], ValueType::ALL[j]);
            j += 1;
        }
        i += 1;
    }
    table
}

/// Widen integers and booleans (scalar or matrix) to real.
pub fn at_least_real(t: ValueType) -> ValueType {
    match t {
        ValueType::Boolean | ValueType::Integer => ValueType::Real,
        ValueType::MatrixBoolean | ValueType::MatrixInteger => ValueType::MatrixReal,
        other => other,
    }
}

/// Value type of an element according to its kind's [`TypeRule`].
pub fn infer_value_type(element: ElementRef<'_>) -> ValueType {
    ensure_sufficient_stack(|| match element.element().type_rule() {
        TypeRule::Declared => element.element().declared_type(),
        TypeRule::Fixed(value_type) => value_type,
        TypeRule::Promote => fold_children(element),
        TypeRule::PromoteAtLeastReal => at_least_real(fold_children(element)),
        TypeRule::FirstChild => element
            .children()
            .next()
            .map_or(ValueType::None, infer_value_type),
        TypeRule::MatrixOfChildren => fold_children(element).matrix_of(),
    })
}

fn fold_children(element: ElementRef<'_>) -> ValueType {
    element
        .children()
        .map(infer_value_type)
        .fold(ValueType::None, promote)
}
