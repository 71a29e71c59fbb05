//! LaTeX backend.

use std::fmt::Write as _;

use quire_tree::{ElementRef, ParenthesisStyle, ValueType};

use crate::backend::{Assembly, Backend};
use crate::context::{DependencyContext, EmitContext};
use crate::error::GenerationError;
use crate::operators::{visible_members, Glyphs, Member, OperatorForm, OperatorTranslator};
use crate::resources::ResourceKind;
use crate::translator::{EmitPhase, Translator};

use super::lists::{list_position, ListKind};
use super::{is_block, is_text};

pub const LATEX: &str = "LaTeX";

const AMSMATH: &[(ResourceKind, &str)] = &[(ResourceKind::Package, "amsmath")];
const MATHTOOLS: &[(ResourceKind, &str)] = &[(ResourceKind::Package, "mathtools")];

static GLYPHS: Glyphs = Glyphs {
    row: ("", ""),
    parentheses: ("\\left(", "\\right)"),
    brackets: ("\\left[", "\\right]"),
    braces: ("\\left\\{", "\\right\\}"),
};

const fn infix(token: &'static str) -> OperatorTranslator {
    OperatorTranslator::new(OperatorForm::Infix(token), &GLYPHS)
}

static ASSIGNMENT: OperatorTranslator = infix(" \\coloneqq ").requiring(MATHTOOLS);
static ADDITION: OperatorTranslator = infix("+");
static SUBTRACTION: OperatorTranslator = infix("-");
static MULTIPLICATION: OperatorTranslator = infix(" \\cdot ");
static DIVISION: OperatorTranslator = OperatorTranslator::new(
    OperatorForm::Fraction {
        open: "\\frac{",
        middle: "}{",
        close: "}",
    },
    &GLYPHS,
);
static POWER: OperatorTranslator = OperatorTranslator::new(
    OperatorForm::Script {
        open: "{",
        middle: "}^{",
        close: "}",
    },
    &GLYPHS,
);
static NEGATION: OperatorTranslator = OperatorTranslator::new(OperatorForm::Prefix("-"), &GLYPHS);
static FACTORIAL: OperatorTranslator = OperatorTranslator::new(OperatorForm::Postfix("!"), &GLYPHS);
static PARENTHESIS: OperatorTranslator = OperatorTranslator::new(OperatorForm::Group, &GLYPHS);
static ABSOLUTE_VALUE: OperatorTranslator = OperatorTranslator::new(
    OperatorForm::Enclose {
        open: "\\left|",
        close: "\\right|",
    },
    &GLYPHS,
);
static LESS_THAN: OperatorTranslator = infix("<");
static GREATER_THAN: OperatorTranslator = infix(">");
static LESS_OR_EQUAL: OperatorTranslator = infix(" \\leq ");
static GREATER_OR_EQUAL: OperatorTranslator = infix(" \\geq ");
static EQUAL: OperatorTranslator = infix("=");
static NOT_EQUAL: OperatorTranslator = infix(" \\neq ");
static LOGICAL_AND: OperatorTranslator = infix(" \\land ");
static LOGICAL_OR: OperatorTranslator = infix(" \\lor ");
static LOGICAL_NOT: OperatorTranslator =
    OperatorTranslator::new(OperatorForm::Prefix("\\lnot "), &GLYPHS);

struct Root;
struct Paragraph;
struct Frame;
struct Text;
struct Literal;
struct Variable;
struct FunctionCall;
struct Matrix;

pub(super) static TRANSLATORS: &[(&str, &'static dyn Translator)] = &[
    ("Root", &Root),
    ("Paragraph", &Paragraph),
    ("Frame", &Frame),
    ("Text", &Text),
    ("Literal", &Literal),
    ("Variable", &Variable),
    ("Assignment", &ASSIGNMENT),
    ("Addition", &ADDITION),
    ("Subtraction", &SUBTRACTION),
    ("Multiplication", &MULTIPLICATION),
    ("Division", &DIVISION),
    ("Power", &POWER),
    ("Negation", &NEGATION),
    ("Factorial", &FACTORIAL),
    ("Parenthesis", &PARENTHESIS),
    ("AbsoluteValue", &ABSOLUTE_VALUE),
    ("LessThan", &LESS_THAN),
    ("GreaterThan", &GREATER_THAN),
    ("LessOrEqual", &LESS_OR_EQUAL),
    ("GreaterOrEqual", &GREATER_OR_EQUAL),
    ("Equal", &EQUAL),
    ("NotEqual", &NOT_EQUAL),
    ("LogicalAnd", &LOGICAL_AND),
    ("LogicalOr", &LOGICAL_OR),
    ("LogicalNot", &LOGICAL_NOT),
    ("FunctionCall", &FunctionCall),
    ("Matrix", &Matrix),
];

/// Escape prose for text mode.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '#' | '$' | '%' | '&' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            other => out.push(other),
        }
    }
    out
}

/// Content of a container at block level: math becomes display math.
fn emit_block_child(ctx: &mut EmitContext<'_>, child: ElementRef<'_>) -> Result<(), GenerationError> {
    if is_block(child) || is_text(child) {
        return ctx.translate(child);
    }
    ctx.write("\\[ ");
    ctx.translate(child)?;
    ctx.write(" \\]\n");
    Ok(())
}

impl Translator for Root {
    fn translate(
        &self,
        element: ElementRef<'_>,
        ctx: &mut EmitContext<'_>,
    ) -> Result<(), GenerationError> {
        for child in element.children() {
            emit_block_child(ctx, child)?;
        }
        Ok(())
    }
}

impl Translator for Paragraph {
    fn translate(
        &self,
        element: ElementRef<'_>,
        ctx: &mut EmitContext<'_>,
    ) -> Result<(), GenerationError> {
        let list = list_position(element);
        if let Some(item) = list {
            if item.opens {
                let environment = match item.kind {
                    ListKind::Numbered => "enumerate",
                    ListKind::Bullet => "itemize",
                };
                ctx.writeln(&format!("\\begin{{{environment}}}"));
                if item.kind == ListKind::Numbered && item.number > 1 {
                    ctx.writeln(&format!("\\setcounter{{enumi}}{{{}}}", item.number - 1));
                }
            }
            ctx.write("\\item ");
        }

        for (index, child) in element.children().enumerate() {
            if index > 0 {
                ctx.write(" ");
            }
            if is_text(child) || is_block(child) {
                ctx.translate(child)?;
            } else {
                ctx.write("$");
                ctx.translate(child)?;
                ctx.write("$");
            }
        }

        match list {
            Some(item) => {
                ctx.newline();
                if item.closes {
                    ctx.writeln(match item.kind {
                        ListKind::Numbered => "\\end{enumerate}",
                        ListKind::Bullet => "\\end{itemize}",
                    });
                }
            }
            None => ctx.write("\n\n"),
        }
        Ok(())
    }
}

impl Translator for Frame {
    fn translate(
        &self,
        element: ElementRef<'_>,
        ctx: &mut EmitContext<'_>,
    ) -> Result<(), GenerationError> {
        ctx.writeln("\\begin{picture}(0,0)");
        for (index, child) in element.children().enumerate() {
            let anchor = element.anchor(index).unwrap_or_default();
            // picture coordinates grow upwards
            ctx.write(&format!(
                "\\put({},{}){{",
                anchor.x,
                anchor.y.saturating_neg()
            ));
            if is_text(child) || is_block(child) {
                ctx.translate(child)?;
            } else {
                ctx.write("$");
                ctx.translate(child)?;
                ctx.write("$");
            }
            ctx.write("}\n");
        }
        ctx.writeln("\\end{picture}");
        Ok(())
    }
}

impl Translator for Text {
    fn translate(
        &self,
        element: ElementRef<'_>,
        ctx: &mut EmitContext<'_>,
    ) -> Result<(), GenerationError> {
        let text = escape(element.text().unwrap_or_default());
        ctx.write(&text);
        Ok(())
    }
}

impl Translator for Literal {
    fn translate(
        &self,
        element: ElementRef<'_>,
        ctx: &mut EmitContext<'_>,
    ) -> Result<(), GenerationError> {
        let text = ctx.decode(element);
        if element.element().declared_type() == ValueType::Boolean {
            ctx.write(&format!("\\mathrm{{{text}}}"));
        } else {
            ctx.write(&text);
        }
        Ok(())
    }
}

/// Single letters stay as they are; longer names are set upright-italic
/// as one word.
fn identifier(name: &str) -> String {
    let escaped = escape(name);
    if name.chars().count() == 1 {
        escaped
    } else {
        format!("\\mathit{{{escaped}}}")
    }
}

impl Translator for Variable {
    fn translate(
        &self,
        element: ElementRef<'_>,
        ctx: &mut EmitContext<'_>,
    ) -> Result<(), GenerationError> {
        let name = identifier(element.text().unwrap_or_default());
        ctx.write(&name);
        Ok(())
    }
}

impl Translator for FunctionCall {
    fn identify_dependencies(
        &self,
        _element: ElementRef<'_>,
        deps: &mut DependencyContext<'_>,
    ) -> Result<(), GenerationError> {
        deps.require(ResourceKind::Package, "amsmath");
        Ok(())
    }

    fn translate(
        &self,
        element: ElementRef<'_>,
        ctx: &mut EmitContext<'_>,
    ) -> Result<(), GenerationError> {
        let text = element.text().unwrap_or_default();
        let (name, subscript) = match ctx.registry().function(text) {
            Some(record) => (record.name.as_str(), record.subscript.as_deref()),
            None => (text, None),
        };
        let mut head = format!("\\operatorname{{{}}}", name.replace('_', "\\_"));
        if let Some(subscript) = subscript {
            let _ = write!(head, "_{{{}}}", subscript.replace('_', "\\_"));
        }
        ctx.write(&head);
        ctx.write(GLYPHS.parentheses.0);
        for (index, argument) in element.children().enumerate() {
            if index > 0 {
                ctx.write(", ");
            }
            ctx.translate(argument)?;
        }
        ctx.write(GLYPHS.parentheses.1);
        Ok(())
    }
}

fn matrix_environment(style: ParenthesisStyle) -> &'static str {
    match style {
        ParenthesisStyle::Default | ParenthesisStyle::Parentheses => "pmatrix",
        ParenthesisStyle::Brackets => "bmatrix",
        ParenthesisStyle::Braces => "Bmatrix",
    }
}

impl Translator for Matrix {
    fn identify_dependencies(
        &self,
        _element: ElementRef<'_>,
        deps: &mut DependencyContext<'_>,
    ) -> Result<(), GenerationError> {
        for &(kind, name) in AMSMATH {
            deps.require(kind, name);
        }
        Ok(())
    }

    fn translate(
        &self,
        element: ElementRef<'_>,
        ctx: &mut EmitContext<'_>,
    ) -> Result<(), GenerationError> {
        let (rows, columns) = element.grid_dimensions().unwrap_or((0, 0));
        let format = element.format();
        let environment = matrix_environment(format.map(|f| f.parenthesis_style).unwrap_or_default());
        let row_members = visible_members(rows, format);
        let column_members = visible_members(columns, format);

        ctx.write(&format!("\\begin{{{environment}}} "));
        for (r_index, row) in row_members.iter().enumerate() {
            if r_index > 0 {
                ctx.write(" \\\\ ");
            }
            for (c_index, column) in column_members.iter().enumerate() {
                if c_index > 0 {
                    ctx.write(" & ");
                }
                match (*row, *column) {
                    (Member::Index(r), Member::Index(c)) => {
                        let cell = element.cell(r, c).ok_or_else(|| {
                            ctx.failure(element, format!("cell ({r}, {c}) is missing"))
                        })?;
                        ctx.translate(cell)?;
                    }
                    (Member::Ellipsis, Member::Ellipsis) => ctx.write("\\ddots"),
                    (Member::Ellipsis, _) => ctx.write("\\vdots"),
                    (_, Member::Ellipsis) => ctx.write("\\cdots"),
                }
            }
        }
        ctx.write(&format!(" \\end{{{environment}}}"));
        Ok(())
    }
}

pub struct LatexBackend;

impl Backend for LatexBackend {
    fn name(&self) -> &str {
        LATEX
    }

    fn assemble(&self, assembly: &Assembly<'_>) -> String {
        let mut out = String::with_capacity(4096);
        let _ = writeln!(out, "\\documentclass{{{}}}", assembly.options.document_class);
        for package in assembly.resources.names(ResourceKind::Package) {
            let _ = writeln!(out, "\\usepackage{{{package}}}");
        }
        if let Some(title) = &assembly.options.title {
            let _ = writeln!(out, "\\title{{{}}}", escape(title));
        }
        out.push_str("\\begin{document}\n");
        if assembly.options.title.is_some() {
            out.push_str("\\maketitle\n");
        }
        out.push_str(assembly.section(EmitPhase::Body));
        out.push_str("\\end{document}\n");
        out
    }
}
