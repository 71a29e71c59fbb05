//! Operator translator framework.
//!
//! Every operator element, on every backend, is rendered by the same
//! strategy: an [`OperatorForm`] says where the operands go relative to
//! the operator tokens, and a backend's [`Glyphs`] say how a row and an
//! explicit grouping are spelled. Grouping decisions read only the shared
//! precedence ladder:
//!
//! ```text
//! wrap operand  iff  Pc < P
//!               or   Pc == P and the parent does not associate at that position
//! ```
//!
//! Operands are emitted by recursing through [`EmitContext::translate`], so
//! nested elements of any kind dispatch uniformly.

mod matrix;
mod promotion;

use quire_tree::{ElementKind, ElementRef, OperandPosition, ParenthesisStyle, Precedence};

use crate::context::{DependencyContext, EmitContext};
use crate::error::GenerationError;
use crate::resources::ResourceKind;
use crate::translator::Translator;

pub use matrix::{visible_members, Member};
pub use promotion::{at_least_real, infer_value_type, promote, PROMOTION};

/// Backend spelling of rows and bracket pairs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Glyphs {
    /// Wraps every composite operator (e.g. `<mrow>` in MathML).
    pub row: (&'static str, &'static str),
    pub parentheses: (&'static str, &'static str),
    pub brackets: (&'static str, &'static str),
    pub braces: (&'static str, &'static str),
}

impl Glyphs {
    /// Bracket pair for an explicit grouping style.
    pub fn pair(&self, style: ParenthesisStyle) -> (&'static str, &'static str) {
        match style {
            ParenthesisStyle::Default | ParenthesisStyle::Parentheses => self.parentheses,
            ParenthesisStyle::Brackets => self.brackets,
            ParenthesisStyle::Braces => self.braces,
        }
    }
}

/// Where operands sit relative to the operator's tokens.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OperatorForm {
    /// `op a`
    Prefix(&'static str),
    /// `a op`
    Postfix(&'static str),
    /// `a op b`
    Infix(&'static str),
    /// `open a middle b close`; only the base may need grouping.
    Script {
        open: &'static str,
        middle: &'static str,
        close: &'static str,
    },
    /// `open a middle b close`; both operands are delimited.
    Fraction {
        open: &'static str,
        middle: &'static str,
        close: &'static str,
    },
    /// `open a close` with fixed delimiters.
    Enclose {
        open: &'static str,
        close: &'static str,
    },
    /// Explicit grouping with the pair chosen by the element's format.
    Group,
    /// `open a separator b ... close`; operands are never grouped.
    Call {
        open: &'static str,
        separator: &'static str,
        close: &'static str,
    },
}

/// Whether an operand of precedence `child` at `position` must be wrapped
/// in explicit grouping under `parent`.
pub fn needs_grouping(parent: &ElementKind, child: Precedence, position: OperandPosition) -> bool {
    child < parent.precedence
        || (child == parent.precedence && !parent.associativity.permits(position))
}

/// Emit operand `index` of `element`, grouped if precedence requires it.
pub fn emit_operand(
    ctx: &mut EmitContext<'_>,
    glyphs: &Glyphs,
    element: ElementRef<'_>,
    index: usize,
    position: OperandPosition,
) -> Result<(), GenerationError> {
    let operand = ctx.operand(element, index)?;
    if needs_grouping(element.element().kind(), operand.precedence(), position) {
        emit_grouped(ctx, glyphs, glyphs.parentheses, operand)
    } else {
        ctx.translate(operand)
    }
}

/// Write `token`, then the operand. A space separates the two when the
/// token ends in a sign the operand's text begins with, so `-` then `-x`
/// never fuses into `--`.
fn emit_after_token(
    ctx: &mut EmitContext<'_>,
    glyphs: &Glyphs,
    token: &str,
    element: ElementRef<'_>,
    index: usize,
    position: OperandPosition,
) -> Result<(), GenerationError> {
    ctx.write(token);
    let Some(sign) = token.chars().last().filter(|c| matches!(c, '-' | '+')) else {
        return emit_operand(ctx, glyphs, element, index, position);
    };
    let text = ctx.capture(|ctx| emit_operand(ctx, glyphs, element, index, position))?;
    if text.starts_with(sign) {
        ctx.write(" ");
    }
    ctx.write(&text);
    Ok(())
}

fn emit_grouped(
    ctx: &mut EmitContext<'_>,
    glyphs: &Glyphs,
    (open, close): (&str, &str),
    operand: ElementRef<'_>,
) -> Result<(), GenerationError> {
    ctx.write(glyphs.row.0);
    ctx.write(open);
    ctx.translate(operand)?;
    ctx.write(close);
    ctx.write(glyphs.row.1);
    Ok(())
}

fn emit_delimited(
    ctx: &mut EmitContext<'_>,
    element: ElementRef<'_>,
    index: usize,
) -> Result<(), GenerationError> {
    let operand = ctx.operand(element, index)?;
    ctx.translate(operand)
}

/// Emit `element` in `form`.
pub fn emit_operator(
    ctx: &mut EmitContext<'_>,
    form: OperatorForm,
    glyphs: &Glyphs,
    element: ElementRef<'_>,
) -> Result<(), GenerationError> {
    if let OperatorForm::Group = form {
        let style = element
            .format()
            .map(|f| f.parenthesis_style)
            .unwrap_or_default();
        let operand = ctx.operand(element, 0)?;
        return emit_grouped(ctx, glyphs, glyphs.pair(style), operand);
    }

    ctx.write(glyphs.row.0);
    match form {
        OperatorForm::Prefix(token) => {
            emit_after_token(ctx, glyphs, token, element, 0, OperandPosition::Only)?;
        }
        OperatorForm::Postfix(token) => {
            emit_operand(ctx, glyphs, element, 0, OperandPosition::Only)?;
            ctx.write(token);
        }
        OperatorForm::Infix(token) => {
            emit_operand(ctx, glyphs, element, 0, OperandPosition::Left)?;
            emit_after_token(ctx, glyphs, token, element, 1, OperandPosition::Right)?;
        }
        OperatorForm::Script {
            open,
            middle,
            close,
        } => {
            ctx.write(open);
            emit_operand(ctx, glyphs, element, 0, OperandPosition::Left)?;
            ctx.write(middle);
            emit_delimited(ctx, element, 1)?;
            ctx.write(close);
        }
        OperatorForm::Fraction {
            open,
            middle,
            close,
        } => {
            ctx.write(open);
            emit_delimited(ctx, element, 0)?;
            ctx.write(middle);
            emit_delimited(ctx, element, 1)?;
            ctx.write(close);
        }
        OperatorForm::Enclose { open, close } => {
            ctx.write(open);
            emit_delimited(ctx, element, 0)?;
            ctx.write(close);
        }
        OperatorForm::Call {
            open,
            separator,
            close,
        } => {
            ctx.write(open);
            for index in 0..element.child_count() {
                if index > 0 {
                    ctx.write(separator);
                }
                emit_delimited(ctx, element, index)?;
            }
            ctx.write(close);
        }
        OperatorForm::Group => {}
    }
    ctx.write(glyphs.row.1);
    Ok(())
}

/// A translator made only of a form, a backend's glyphs, and the resources
/// the rendering needs.
pub struct OperatorTranslator {
    form: OperatorForm,
    glyphs: &'static Glyphs,
    resources: &'static [(ResourceKind, &'static str)],
}

impl OperatorTranslator {
    pub const fn new(form: OperatorForm, glyphs: &'static Glyphs) -> Self {
        OperatorTranslator {
            form,
            glyphs,
            resources: &[],
        }
    }

    #[must_use]
    pub const fn requiring(mut self, resources: &'static [(ResourceKind, &'static str)]) -> Self {
        self.resources = resources;
        self
    }

    pub fn form(&self) -> OperatorForm {
        self.form
    }
}

impl Translator for OperatorTranslator {
    fn identify_dependencies(
        &self,
        _element: ElementRef<'_>,
        deps: &mut DependencyContext<'_>,
    ) -> Result<(), GenerationError> {
        for &(kind, name) in self.resources {
            deps.require(kind, name);
        }
        Ok(())
    }

    fn translate(
        &self,
        element: ElementRef<'_>,
        ctx: &mut EmitContext<'_>,
    ) -> Result<(), GenerationError> {
        emit_operator(ctx, self.form, self.glyphs, element)
    }
}

#[cfg(test)]
mod tests;
