//! Per-kind constants stamped onto elements by their creators.
//!
//! Precedence is a property of the element kind, not of any backend: every
//! backend reads the same ladder when deciding whether an operand needs
//! explicit grouping.

use crate::ValueType;

/// Intrinsic precedence of an element kind.
///
/// Higher number = binds more tightly. Leaves and self-delimiting
/// constructs sit at [`Precedence::ATOM`] and are never wrapped.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct Precedence(pub u16);

impl Precedence {
    pub const ASSIGNMENT: Precedence = Precedence(1);
    pub const LOGICAL_OR: Precedence = Precedence(2);
    pub const LOGICAL_AND: Precedence = Precedence(3);
    pub const LOGICAL_NOT: Precedence = Precedence(4);
    pub const RELATIONAL: Precedence = Precedence(5);
    pub const ADDITION: Precedence = Precedence(10);
    pub const MULTIPLICATION: Precedence = Precedence(20);
    pub const UNARY_MINUS: Precedence = Precedence(25);
    pub const POWER: Precedence = Precedence(30);
    pub const POSTFIX: Precedence = Precedence(35);
    pub const FUNCTION: Precedence = Precedence(40);
    pub const GROUPING: Precedence = Precedence(50);
    pub const ATOM: Precedence = Precedence(100);

    /// The full ladder, loosest first.
    pub const LADDER: [Precedence; 13] = [
        Self::ASSIGNMENT,
        Self::LOGICAL_OR,
        Self::LOGICAL_AND,
        Self::LOGICAL_NOT,
        Self::RELATIONAL,
        Self::ADDITION,
        Self::MULTIPLICATION,
        Self::UNARY_MINUS,
        Self::POWER,
        Self::POSTFIX,
        Self::FUNCTION,
        Self::GROUPING,
        Self::ATOM,
    ];
}

impl Default for Precedence {
    fn default() -> Self {
        Self::ATOM
    }
}

/// Which operand slot of an operator is being rendered.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum OperandPosition {
    Left,
    Right,
    /// Sole operand of a prefix or postfix operator.
    Only,
}

/// Positions in which an operator tolerates an equal-precedence operand
/// without grouping.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Associativity {
    /// `a - b - c` == `(a - b) - c`; right operand must be grouped.
    Left,
    /// `a ^ b ^ c` == `a ^ (b ^ c)`; left operand must be grouped.
    Right,
    /// Fully associative (`+`, `*`): no grouping at equal precedence.
    #[default]
    Both,
    /// Chaining is meaningless (`a < b < c`); always group.
    None,
}

impl Associativity {
    /// Whether an equal-precedence operand at `position` may stay ungrouped.
    pub const fn permits(self, position: OperandPosition) -> bool {
        match (self, position) {
            (Associativity::Both, _)
            | (Associativity::Left, OperandPosition::Left)
            | (Associativity::Right, OperandPosition::Right) => true,
            // A unary operator applied to an equal-precedence operand
            // (`--x`, `x!!`) reads unambiguously.
            (Associativity::Left | Associativity::Right, OperandPosition::Only) => true,
            _ => false,
        }
    }
}

/// How an element's value type is derived.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum TypeRule {
    /// The element's own declared type (literals, variables).
    #[default]
    Declared,
    /// Fold all children through the promotion table.
    Promote,
    /// Like `Promote`, but integers and booleans widen to real (division).
    PromoteAtLeastReal,
    /// Always this type (relational and logical operators yield booleans).
    Fixed(ValueType),
    /// Same type as the first child (grouping, negation).
    FirstChild,
    /// Matrix of the promoted child element types.
    MatrixOfChildren,
}

/// How many and which kind of children an element holds.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ChildPlacement {
    Leaf,
    /// Fixed number of ordered slots.
    Positional(usize),
    /// Variable-length ordered list.
    Group,
    /// Row-major cells, addressable by row and column.
    Grid,
    /// Children anchored at free positions.
    Floating,
}

/// Everything an element creator needs to stamp onto a fresh element.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ElementKind {
    pub placement: ChildPlacement,
    pub precedence: Precedence,
    pub associativity: Associativity,
    pub type_rule: TypeRule,
    pub declared_type: ValueType,
}

impl ElementKind {
    /// A leaf of the given declared type.
    pub const fn leaf(declared_type: ValueType) -> Self {
        ElementKind {
            placement: ChildPlacement::Leaf,
            precedence: Precedence::ATOM,
            associativity: Associativity::Both,
            type_rule: TypeRule::Declared,
            declared_type,
        }
    }

    /// A structural container with a variable number of children.
    pub const fn group() -> Self {
        ElementKind {
            placement: ChildPlacement::Group,
            precedence: Precedence::ATOM,
            associativity: Associativity::Both,
            type_rule: TypeRule::Fixed(ValueType::None),
            declared_type: ValueType::None,
        }
    }

    /// An operator with `arity` ordered operands.
    pub const fn operator(
        arity: usize,
        precedence: Precedence,
        associativity: Associativity,
        type_rule: TypeRule,
    ) -> Self {
        ElementKind {
            placement: ChildPlacement::Positional(arity),
            precedence,
            associativity,
            type_rule,
            declared_type: ValueType::None,
        }
    }

    #[must_use]
    pub const fn with_placement(mut self, placement: ChildPlacement) -> Self {
        self.placement = placement;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ladder_is_strictly_increasing() {
        for pair in Precedence::LADDER.windows(2) {
            assert!(pair[0] < pair[1], "{:?} !< {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        assert!(Precedence::MULTIPLICATION > Precedence::ADDITION);
        assert!(Precedence::POWER > Precedence::UNARY_MINUS);
    }

    #[test]
    fn test_associativity_permits() {
        assert!(Associativity::Left.permits(OperandPosition::Left));
        assert!(!Associativity::Left.permits(OperandPosition::Right));
        assert!(Associativity::Right.permits(OperandPosition::Right));
        assert!(!Associativity::Right.permits(OperandPosition::Left));
        assert!(Associativity::Both.permits(OperandPosition::Right));
        assert!(!Associativity::None.permits(OperandPosition::Left));
        assert!(!Associativity::None.permits(OperandPosition::Only));
    }
}
