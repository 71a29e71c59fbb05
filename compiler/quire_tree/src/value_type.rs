//! Intrinsic value types of elements.
//!
//! The discriminants are part of the plug-in ABI (function definitions carry
//! parameter and return types as raw `u32` codes), so they must never be
//! renumbered.

use std::fmt;

/// The value type an element evaluates to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord, Default)]
#[repr(u32)]
pub enum ValueType {
    /// No value (statements, prose, invalid combinations).
    #[default]
    None = 0,
    /// Type only known at run time.
    Variant = 1,
    Boolean = 2,
    Integer = 3,
    Real = 4,
    Complex = 5,
    Set = 6,
    Tuple = 7,
    MatrixBoolean = 8,
    MatrixInteger = 9,
    MatrixReal = 10,
    MatrixComplex = 11,
}

impl ValueType {
    /// Number of value types; the promotion table is `COUNT x COUNT`.
    pub const COUNT: usize = 12;

    /// Every value type, in discriminant order.
    pub const ALL: [ValueType; Self::COUNT] = [
        ValueType::None,
        ValueType::Variant,
        ValueType::Boolean,
        ValueType::Integer,
        ValueType::Real,
        ValueType::Complex,
        ValueType::Set,
        ValueType::Tuple,
        ValueType::MatrixBoolean,
        ValueType::MatrixInteger,
        ValueType::MatrixReal,
        ValueType::MatrixComplex,
    ];

    /// Stable ABI code.
    #[inline]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Decode an ABI code, `None` for unknown codes.
    pub const fn from_code(code: u32) -> Option<ValueType> {
        if (code as usize) < Self::COUNT {
            Some(Self::ALL[code as usize])
        } else {
            None
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            ValueType::None => "none",
            ValueType::Variant => "variant",
            ValueType::Boolean => "boolean",
            ValueType::Integer => "integer",
            ValueType::Real => "real",
            ValueType::Complex => "complex",
            ValueType::Set => "set",
            ValueType::Tuple => "tuple",
            ValueType::MatrixBoolean => "boolean matrix",
            ValueType::MatrixInteger => "integer matrix",
            ValueType::MatrixReal => "real matrix",
            ValueType::MatrixComplex => "complex matrix",
        }
    }

    /// True for the four scalar numeric-like types.
    pub const fn is_scalar(self) -> bool {
        matches!(
            self,
            ValueType::Boolean | ValueType::Integer | ValueType::Real | ValueType::Complex
        )
    }

    pub const fn is_matrix(self) -> bool {
        matches!(
            self,
            ValueType::MatrixBoolean
                | ValueType::MatrixInteger
                | ValueType::MatrixReal
                | ValueType::MatrixComplex
        )
    }

    /// Element type of a matrix type; scalars map to themselves.
    pub const fn scalar_of(self) -> ValueType {
        match self {
            ValueType::MatrixBoolean => ValueType::Boolean,
            ValueType::MatrixInteger => ValueType::Integer,
            ValueType::MatrixReal => ValueType::Real,
            ValueType::MatrixComplex => ValueType::Complex,
            other => other,
        }
    }

    /// Matrix type holding elements of this scalar type.
    ///
    /// Non-scalar types have no matrix form and yield `Variant`.
    pub const fn matrix_of(self) -> ValueType {
        match self.scalar_of() {
            ValueType::Boolean => ValueType::MatrixBoolean,
            ValueType::Integer => ValueType::MatrixInteger,
            ValueType::Real => ValueType::MatrixReal,
            ValueType::Complex => ValueType::MatrixComplex,
            ValueType::None => ValueType::None,
            _ => ValueType::Variant,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests;
