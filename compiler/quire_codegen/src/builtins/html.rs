//! HTML backend with presentation MathML.

use std::fmt::Write as _;

use quire_tree::{ElementRef, ValueType};

use crate::backend::{Assembly, Backend};
use crate::context::{DependencyContext, EmitContext};
use crate::decode::PLACEHOLDER;
use crate::error::GenerationError;
use crate::operators::{visible_members, Glyphs, Member, OperatorForm, OperatorTranslator};
use crate::resources::ResourceKind;
use crate::translator::{EmitPhase, Translator};

use super::lists::{list_position, ListKind};
use super::{is_block, is_text};

pub const HTML: &str = "HTML";

const FRAME_STYLESHEET: &str = "quire-frame.css";

static GLYPHS: Glyphs = Glyphs {
    row: ("<mrow>", "</mrow>"),
    parentheses: ("<mo>(</mo>", "<mo>)</mo>"),
    brackets: ("<mo>[</mo>", "<mo>]</mo>"),
    braces: ("<mo>{</mo>", "<mo>}</mo>"),
};

const fn infix(token: &'static str) -> OperatorTranslator {
    OperatorTranslator::new(OperatorForm::Infix(token), &GLYPHS)
}

static ASSIGNMENT: OperatorTranslator = infix("<mo>&#x2254;</mo>");
static ADDITION: OperatorTranslator = infix("<mo>+</mo>");
static SUBTRACTION: OperatorTranslator = infix("<mo>&minus;</mo>");
static MULTIPLICATION: OperatorTranslator = infix("<mo>&sdot;</mo>");
static DIVISION: OperatorTranslator = OperatorTranslator::new(
    OperatorForm::Fraction {
        open: "<mfrac>",
        middle: "",
        close: "</mfrac>",
    },
    &GLYPHS,
);
static POWER: OperatorTranslator = OperatorTranslator::new(
    OperatorForm::Script {
        open: "<msup>",
        middle: "",
        close: "</msup>",
    },
    &GLYPHS,
);
static NEGATION: OperatorTranslator =
    OperatorTranslator::new(OperatorForm::Prefix("<mo>&minus;</mo>"), &GLYPHS);
static FACTORIAL: OperatorTranslator =
    OperatorTranslator::new(OperatorForm::Postfix("<mo>!</mo>"), &GLYPHS);
static PARENTHESIS: OperatorTranslator = OperatorTranslator::new(OperatorForm::Group, &GLYPHS);
static ABSOLUTE_VALUE: OperatorTranslator = OperatorTranslator::new(
    OperatorForm::Enclose {
        open: "<mo>|</mo>",
        close: "<mo>|</mo>",
    },
    &GLYPHS,
);
static LESS_THAN: OperatorTranslator = infix("<mo>&lt;</mo>");
static GREATER_THAN: OperatorTranslator = infix("<mo>&gt;</mo>");
static LESS_OR_EQUAL: OperatorTranslator = infix("<mo>&le;</mo>");
static GREATER_OR_EQUAL: OperatorTranslator = infix("<mo>&ge;</mo>");
static EQUAL: OperatorTranslator = infix("<mo>=</mo>");
static NOT_EQUAL: OperatorTranslator = infix("<mo>&ne;</mo>");
static LOGICAL_AND: OperatorTranslator = infix("<mo>&and;</mo>");
static LOGICAL_OR: OperatorTranslator = infix("<mo>&or;</mo>");
static LOGICAL_NOT: OperatorTranslator =
    OperatorTranslator::new(OperatorForm::Prefix("<mo>&not;</mo>"), &GLYPHS);

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

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

/// Content of a container at block level: math becomes a display block.
fn emit_block_child(ctx: &mut EmitContext<'_>, child: ElementRef<'_>) -> Result<(), GenerationError> {
    if is_block(child) || is_text(child) {
        return ctx.translate(child);
    }
    ctx.write("<math display=\"block\">");
    ctx.translate(child)?;
    ctx.write("</math>\n");
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
        let (open, close) = match list {
            Some(item) => {
                if item.opens {
                    match item.kind {
                        ListKind::Numbered if item.number != 1 => {
                            ctx.writeln(&format!("<ol start=\"{}\">", item.number));
                        }
                        ListKind::Numbered => ctx.writeln("<ol>"),
                        ListKind::Bullet => ctx.writeln("<ul>"),
                    }
                    ctx.indent();
                }
                ("<li>", "</li>")
            }
            None => ("<p>", "</p>"),
        };

        ctx.write_indent();
        ctx.write(open);
        for (index, child) in element.children().enumerate() {
            if index > 0 {
                ctx.write(" ");
            }
            if is_text(child) || is_block(child) {
                ctx.translate(child)?;
            } else {
                ctx.write("<math>");
                ctx.translate(child)?;
                ctx.write("</math>");
            }
        }
        ctx.write(close);
        ctx.newline();

        if let Some(item) = list.filter(|item| item.closes) {
            ctx.dedent();
            ctx.writeln(match item.kind {
                ListKind::Numbered => "</ol>",
                ListKind::Bullet => "</ul>",
            });
        }
        Ok(())
    }
}

impl Translator for Frame {
    fn identify_dependencies(
        &self,
        _element: ElementRef<'_>,
        deps: &mut DependencyContext<'_>,
    ) -> Result<(), GenerationError> {
        deps.require(ResourceKind::Stylesheet, FRAME_STYLESHEET);
        Ok(())
    }

    fn translate(
        &self,
        element: ElementRef<'_>,
        ctx: &mut EmitContext<'_>,
    ) -> Result<(), GenerationError> {
        ctx.writeln("<div class=\"quire-frame\">");
        for (index, child) in element.children().enumerate() {
            let anchor = element.anchor(index).unwrap_or_default();
            ctx.write(&format!(
                "<div class=\"quire-anchor\" style=\"left:{}px;top:{}px\">",
                anchor.x, anchor.y
            ));
            emit_block_child(ctx, child)?;
            ctx.write("</div>\n");
        }
        ctx.writeln("</div>");
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
        let text = escape(&ctx.decode(element));
        let tag = if text == PLACEHOLDER {
            "mtext"
        } else if element.element().declared_type() == ValueType::Boolean {
            "mi"
        } else {
            "mn"
        };
        ctx.write(&format!("<{tag}>{text}</{tag}>"));
        Ok(())
    }
}

impl Translator for Variable {
    fn translate(
        &self,
        element: ElementRef<'_>,
        ctx: &mut EmitContext<'_>,
    ) -> Result<(), GenerationError> {
        let name = escape(element.text().unwrap_or_default());
        ctx.write(&format!("<mi>{name}</mi>"));
        Ok(())
    }
}

impl Translator for FunctionCall {
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
        let mut head = format!("<mi>{}</mi>", escape(name));
        if let Some(subscript) = subscript {
            head = format!("<msub>{head}<mi>{}</mi></msub>", escape(subscript));
        }

        ctx.write("<mrow>");
        ctx.write(&head);
        ctx.write("<mo>&ApplyFunction;</mo><mrow><mo>(</mo>");
        for (index, argument) in element.children().enumerate() {
            if index > 0 {
                ctx.write("<mo>,</mo>");
            }
            ctx.translate(argument)?;
        }
        ctx.write("<mo>)</mo></mrow></mrow>");
        Ok(())
    }
}

impl Translator for Matrix {
    fn translate(
        &self,
        element: ElementRef<'_>,
        ctx: &mut EmitContext<'_>,
    ) -> Result<(), GenerationError> {
        let (rows, columns) = element.grid_dimensions().unwrap_or((0, 0));
        let format = element.format();
        let (open, close) = GLYPHS.pair(format.map(|f| f.parenthesis_style).unwrap_or_default());
        let row_members = visible_members(rows, format);
        let column_members = visible_members(columns, format);

        ctx.write("<mrow>");
        ctx.write(open);
        ctx.write("<mtable>");
        for row in &row_members {
            ctx.write("<mtr>");
            for column in &column_members {
                ctx.write("<mtd>");
                match (*row, *column) {
                    (Member::Index(r), Member::Index(c)) => {
                        let cell = element.cell(r, c).ok_or_else(|| {
                            ctx.failure(element, format!("cell ({r}, {c}) is missing"))
                        })?;
                        ctx.translate(cell)?;
                    }
                    (Member::Ellipsis, Member::Ellipsis) => ctx.write("<mo>&dtdot;</mo>"),
                    (Member::Ellipsis, _) => ctx.write("<mo>&vellip;</mo>"),
                    (_, Member::Ellipsis) => ctx.write("<mo>&ctdot;</mo>"),
                }
                ctx.write("</mtd>");
            }
            ctx.write("</mtr>");
        }
        ctx.write("</mtable>");
        ctx.write(close);
        ctx.write("</mrow>");
        Ok(())
    }
}

pub struct HtmlBackend;

impl Backend for HtmlBackend {
    fn name(&self) -> &str {
        HTML
    }

    fn assemble(&self, assembly: &Assembly<'_>) -> String {
        let mut out = String::with_capacity(4096);
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        let title = assembly.options.title.as_deref().unwrap_or("Untitled");
        let _ = writeln!(out, "<title>{}</title>", escape(title));
        for stylesheet in assembly.resources.names(ResourceKind::Stylesheet) {
            let _ = writeln!(out, "<link rel=\"stylesheet\" href=\"{}\">", escape(stylesheet));
        }
        for script in assembly.resources.names(ResourceKind::Script) {
            let _ = writeln!(out, "<script src=\"{}\"></script>", escape(script));
        }
        out.push_str("</head>\n<body>\n");
        if let Some(title) = &assembly.options.title {
            let _ = writeln!(out, "<h1>{}</h1>", escape(title));
        }
        out.push_str(assembly.section(EmitPhase::Body));
        out.push_str("</body>\n</html>\n");
        out
    }
}
