//! Stable handles into the element arena.

use std::fmt;

/// Index of an element inside an [`ElementTree`](crate::ElementTree).
///
/// Handles are plain indices: copying one never affects ownership, and a
/// handle stays valid for the lifetime of the tree that issued it (elements
/// are never removed from the arena).
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ElementId(u32);

impl ElementId {
    /// Sentinel for "no element" (e.g. the parent of the root, an empty slot).
    pub const INVALID: ElementId = ElementId(u32::MAX);

    #[inline]
    pub const fn new(index: u32) -> Self {
        ElementId(index)
    }

    /// Index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "ElementId({})", self.0)
        } else {
            write!(f, "ElementId::INVALID")
        }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            write!(f, "#invalid")
        }
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::INVALID
    }
}

#[cfg(test)]
mod tests;
