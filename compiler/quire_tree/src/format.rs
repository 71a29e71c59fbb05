//! Backend-agnostic display parameters attached to an element.
//!
//! A [`Format`] is read-only during generation. Backends interpret the
//! fields they understand and ignore the rest.

/// Bracket glyphs used for explicit grouping elements.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum ParenthesisStyle {
    /// Backend default (round parentheses).
    #[default]
    Default,
    Parentheses,
    Brackets,
    Braces,
}

/// List membership of a paragraph.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ListStyle {
    Bullet,
    /// Numbered list item. `restart_at` starts a new count instead of
    /// continuing the run begun by earlier siblings.
    Numbered { restart_at: Option<u32> },
}

/// Display parameters for one element.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Format {
    /// Digits after the decimal point for real and complex values.
    pub precision: Option<u32>,
    pub parenthesis_style: ParenthesisStyle,
    /// Rows/columns shown before an ellipsis when a matrix is truncated.
    pub leading_members: Option<usize>,
    /// Rows/columns shown after the ellipsis.
    pub trailing_members: Option<usize>,
    pub list_style: Option<ListStyle>,
}

impl Format {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    #[must_use]
    pub fn with_parenthesis_style(mut self, style: ParenthesisStyle) -> Self {
        self.parenthesis_style = style;
        self
    }

    #[must_use]
    pub fn with_members(mut self, leading: usize, trailing: usize) -> Self {
        self.leading_members = Some(leading);
        self.trailing_members = Some(trailing);
        self
    }

    #[must_use]
    pub fn with_list_style(mut self, style: ListStyle) -> Self {
        self.list_style = Some(style);
        self
    }

    /// True when this format marks a numbered list item.
    pub fn is_numbered(&self) -> bool {
        matches!(self.list_style, Some(ListStyle::Numbered { .. }))
    }
}
