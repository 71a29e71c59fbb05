//! Native C++ backend.
//!
//! Output is a translation unit against the model API header: file-scope
//! declarations for every assigned variable, then the document's
//! statements inside an `extern "C"` entry point that the host compiles
//! and loads.

use std::fmt::Write as _;

use quire_tree::{ElementRef, ValueType};

use crate::backend::{Assembly, Backend};
use crate::context::{DependencyContext, EmitContext};
use crate::decode::{parse_boolean, parse_complex, parse_integer, parse_real};
use crate::error::GenerationError;
use crate::operators::{emit_operator, Glyphs, OperatorForm, OperatorTranslator};
use crate::registry::{FunctionRecord, LibraryOwner};
use crate::resources::{ResourceKind, ResourceSet};
use crate::translator::{EmitPhase, Translator};

use super::{is_block, is_text};

pub const NATIVE: &str = "Cpp";

/// Header declaring the model runtime and every vendor library.
pub const MODEL_HEADER: &str = "model_api.h";

/// C++ type of a value.
pub fn native_type(value_type: ValueType) -> &'static str {
    match value_type {
        ValueType::None => "void",
        ValueType::Variant => "Model::Variant",
        ValueType::Boolean => "Model::Boolean",
        ValueType::Integer => "Model::Integer",
        ValueType::Real => "Model::Real",
        ValueType::Complex => "Model::Complex",
        ValueType::Set => "Model::Set",
        ValueType::Tuple => "Model::Tuple",
        ValueType::MatrixBoolean => "Model::MatrixBoolean",
        ValueType::MatrixInteger => "Model::MatrixInteger",
        ValueType::MatrixReal => "Model::MatrixReal",
        ValueType::MatrixComplex => "Model::MatrixComplex",
    }
}

/// C++ parameter type: scalars by value, everything else by const
/// reference.
pub fn native_parameter_type(value_type: ValueType) -> String {
    if value_type.is_scalar() || value_type == ValueType::None {
        native_type(value_type).to_string()
    } else {
        format!("const {}&", native_type(value_type))
    }
}

/// C++ identifier for a document variable.
pub fn mangle(identifier: &str) -> String {
    let mut result = String::with_capacity(identifier.len() + 2);
    result.push_str("v_");
    for c in identifier.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            result.push(c);
        } else {
            let _ = write!(result, "u{:x}", u32::from(c));
        }
    }
    result
}

static GLYPHS: Glyphs = Glyphs {
    row: ("", ""),
    parentheses: ("(", ")"),
    // C++ has one grouping bracket.
    brackets: ("(", ")"),
    braces: ("(", ")"),
};

const fn infix(token: &'static str) -> OperatorTranslator {
    OperatorTranslator::new(OperatorForm::Infix(token), &GLYPHS)
}

const fn call(open: &'static str) -> OperatorTranslator {
    OperatorTranslator::new(
        OperatorForm::Call {
            open,
            separator: ", ",
            close: ")",
        },
        &GLYPHS,
    )
}

static ADDITION: OperatorTranslator = infix("+");
static SUBTRACTION: OperatorTranslator = infix("-");
static MULTIPLICATION: OperatorTranslator = infix("*");
// `/` would truncate integer operands; division always yields at least a
// real.
static DIVISION: OperatorTranslator = call("Model::divide(");
static POWER: OperatorTranslator = call("Model::pow(");
static NEGATION: OperatorTranslator = OperatorTranslator::new(OperatorForm::Prefix("-"), &GLYPHS);
static FACTORIAL: OperatorTranslator = call("Model::factorial(");
static PARENTHESIS: OperatorTranslator = OperatorTranslator::new(OperatorForm::Group, &GLYPHS);
static ABSOLUTE_VALUE: OperatorTranslator = call("Model::abs(");
static LESS_THAN: OperatorTranslator = infix("<");
static GREATER_THAN: OperatorTranslator = infix(">");
static LESS_OR_EQUAL: OperatorTranslator = infix("<=");
static GREATER_OR_EQUAL: OperatorTranslator = infix(">=");
static EQUAL: OperatorTranslator = infix("==");
static NOT_EQUAL: OperatorTranslator = infix("!=");
static LOGICAL_AND: OperatorTranslator = infix(" && ");
static LOGICAL_OR: OperatorTranslator = infix(" || ");
// `!` binds tighter than every binary operator in C++.
static LOGICAL_NOT: OperatorTranslator = OperatorTranslator::new(
    OperatorForm::Enclose {
        open: "!(",
        close: ")",
    },
    &GLYPHS,
);

const ASSIGN: OperatorForm = OperatorForm::Infix(" = ");

/// Statements of a container: nested containers recurse, prose is
/// dropped, anything else becomes an expression statement.
struct Block;
struct Text;
struct Literal;
struct Variable;
struct Assignment;
struct FunctionCall;
struct Matrix;

pub(super) static TRANSLATORS: &[(&str, &'static dyn Translator)] = &[
    ("Root", &Block),
    ("Paragraph", &Block),
    ("Frame", &Block),
    ("Text", &Text),
    ("Literal", &Literal),
    ("Variable", &Variable),
    ("Assignment", &Assignment),
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

impl Translator for Block {
    fn translate(
        &self,
        element: ElementRef<'_>,
        ctx: &mut EmitContext<'_>,
    ) -> Result<(), GenerationError> {
        for child in element.children() {
            if is_block(child) || is_text(child) {
                ctx.translate(child)?;
            } else {
                ctx.write_indent();
                ctx.translate(child)?;
                ctx.write(";\n");
            }
        }
        Ok(())
    }
}

impl Translator for Text {
    fn translate(&self, _: ElementRef<'_>, _: &mut EmitContext<'_>) -> Result<(), GenerationError> {
        Ok(())
    }
}

impl Translator for Literal {
    fn translate(
        &self,
        element: ElementRef<'_>,
        ctx: &mut EmitContext<'_>,
    ) -> Result<(), GenerationError> {
        let raw = element.text().unwrap_or_default();
        let value_type = element.element().declared_type();
        let code = match value_type {
            ValueType::Boolean => parse_boolean(raw).map(|b| b.to_string()),
            ValueType::Integer => parse_integer(raw).map(|n| n.to_string()),
            ValueType::Real => parse_real(raw).map(|v| format!("{v:?}")),
            ValueType::Complex => {
                parse_complex(raw).map(|(re, im)| format!("Model::Complex({re:?}, {im:?})"))
            }
            _ => {
                return Err(ctx.failure(element, format!("cannot emit a {value_type} literal")));
            }
        };
        let code = code.ok_or_else(|| {
            ctx.failure(element, format!("'{raw}' is not a valid {value_type} value"))
        })?;
        ctx.write(&code);
        Ok(())
    }
}

fn identifier<'t>(
    ctx: &EmitContext<'_>,
    element: ElementRef<'t>,
) -> Result<&'t str, GenerationError> {
    element
        .text()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ctx.failure(element, "element has no name"))
}

impl Translator for Variable {
    fn translate(
        &self,
        element: ElementRef<'_>,
        ctx: &mut EmitContext<'_>,
    ) -> Result<(), GenerationError> {
        let name = mangle(identifier(ctx, element)?);
        ctx.write(&name);
        Ok(())
    }
}

impl Translator for Assignment {
    fn translate(
        &self,
        element: ElementRef<'_>,
        ctx: &mut EmitContext<'_>,
    ) -> Result<(), GenerationError> {
        emit_operator(ctx, ASSIGN, &GLYPHS, element)
    }

    /// Declares the target at file scope the first time it is assigned.
    fn declare(
        &self,
        element: ElementRef<'_>,
        ctx: &mut EmitContext<'_>,
    ) -> Result<(), GenerationError> {
        let target = ctx.operand(element, 0)?;
        let value = ctx.operand(element, 1)?;
        if target.type_name() != "Variable" {
            return Err(ctx.failure(element, "only variables can be assigned"));
        }
        let name = mangle(identifier(ctx, target)?);
        if ctx.mark_declared(name.clone()) {
            let value_type = match ctx.value_type(value) {
                ValueType::None => ValueType::Variant,
                other => other,
            };
            ctx.writeln(&format!("{} {name};", native_type(value_type)));
        }
        ctx.translate(value)
    }
}

fn lookup<'r>(
    ctx: &EmitContext<'r>,
    element: ElementRef<'_>,
) -> Result<&'r FunctionRecord, GenerationError> {
    let name = identifier(ctx, element)?;
    ctx.registry()
        .function(name)
        .ok_or_else(|| ctx.failure(element, format!("unknown function '{name}'")))
}

impl Translator for FunctionCall {
    /// Links the owning library, includes generated declarations for
    /// customer libraries, and checks that some variant takes this many
    /// arguments.
    fn identify_dependencies(
        &self,
        element: ElementRef<'_>,
        deps: &mut DependencyContext<'_>,
    ) -> Result<(), GenerationError> {
        let name = element.text().unwrap_or_default();
        let registry = deps.registry();
        let record = registry
            .function(name)
            .ok_or_else(|| deps.failure(element, format!("unknown function '{name}'")))?;
        let arguments = element.child_count();
        if !record.variants.iter().any(|v| v.parameters.len() == arguments) {
            return Err(deps.failure(
                element,
                format!("no variant of '{name}' takes {arguments} arguments"),
            ));
        }
        deps.require(ResourceKind::Library, record.library.clone());
        if registry
            .runtime_library(&record.library)
            .is_some_and(|library| library.owner == LibraryOwner::Customer)
        {
            deps.require(ResourceKind::Header, format!("{}.h", record.library));
        }
        Ok(())
    }

    fn translate(
        &self,
        element: ElementRef<'_>,
        ctx: &mut EmitContext<'_>,
    ) -> Result<(), GenerationError> {
        let record = lookup(ctx, element)?;
        ctx.write(&record.internal_name);
        ctx.write("(");
        let mut first = true;
        if record.requires_rng {
            ctx.write("Model::rng()");
            first = false;
        }
        for argument in element.children() {
            if !first {
                ctx.write(", ");
            }
            first = false;
            ctx.translate(argument)?;
        }
        ctx.write(")");
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
        ctx.write(&format!("Model::Matrix({rows}, {columns}, {{"));
        for (index, cell) in element.children().enumerate() {
            if index > 0 {
                ctx.write(", ");
            }
            ctx.translate(cell)?;
        }
        ctx.write("})");
        Ok(())
    }
}

/// Emits declarations, then the body inside the entry point.
pub struct NativeBackend;

impl Backend for NativeBackend {
    fn name(&self) -> &str {
        NATIVE
    }

    fn emit_phases(&self) -> &'static [EmitPhase] {
        &[EmitPhase::Declarations, EmitPhase::Body]
    }

    fn base_resources(&self, resources: &mut ResourceSet) {
        resources.insert(ResourceKind::Header, MODEL_HEADER);
    }

    fn assemble(&self, assembly: &Assembly<'_>) -> String {
        let mut out = String::with_capacity(4096);
        out.push_str("// Generated by quire. Do not edit.\n");
        let _ = writeln!(out, "#include \"{MODEL_HEADER}\"");
        for header in assembly.resources.names(ResourceKind::Header) {
            if header != MODEL_HEADER {
                let _ = writeln!(out, "#include \"{header}\"");
            }
        }
        if !assembly.link_order.is_empty() {
            let _ = writeln!(out, "// link: {}", assembly.link_order.join(" "));
        }
        out.push('\n');

        let declarations = assembly.section(EmitPhase::Declarations);
        if !declarations.is_empty() {
            out.push_str(declarations);
            out.push('\n');
        }

        let _ = writeln!(out, "extern \"C\" void {}()", assembly.options.entry_point);
        out.push_str("{\n");
        let indent = " ".repeat(assembly.options.indent);
        for line in assembly.section(EmitPhase::Body).lines() {
            if !line.is_empty() {
                out.push_str(&indent);
            }
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("}\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mangle() {
        assert_eq!(mangle("x"), "v_x");
        assert_eq!(mangle("x_1"), "v_x_1");
        assert_eq!(mangle("α"), "v_u3b1");
    }

    #[test]
    fn test_parameter_types() {
        assert_eq!(native_parameter_type(ValueType::Real), "Model::Real");
        assert_eq!(native_parameter_type(ValueType::Set), "const Model::Set&");
        assert_eq!(
            native_parameter_type(ValueType::MatrixComplex),
            "const Model::MatrixComplex&"
        );
    }
}
