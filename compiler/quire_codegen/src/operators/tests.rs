#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use quire_tree::{
    parse_notation, Associativity, ElementKind, ElementTree, OperandPosition, Precedence,
    TypeRule, ValueType,
};

use super::*;
use crate::options::GeneratorOptions;
use crate::registry::Registry;
use crate::resources::ResourceSet;

fn operator(precedence: Precedence, associativity: Associativity) -> ElementKind {
    ElementKind::operator(2, precedence, associativity, TypeRule::Promote)
}

/// Body text of the first statement of `source` on `backend`.
fn emit(backend: &str, source: &str) -> String {
    let registry = Registry::with_builtins();
    let tree = parse_notation(source, &registry).unwrap();
    emit_tree(&registry, backend, &tree)
}

fn emit_tree(registry: &Registry, backend: &str, tree: &ElementTree) -> String {
    let options = GeneratorOptions::fragment();
    let resources = ResourceSet::new();
    let mut ctx = EmitContext::new(registry, backend, &options, &resources);
    let root = tree.root_cursor().unwrap();
    ctx.translate(root).unwrap();
    ctx.take_output()
}

// Grouping rule

#[test]
fn test_looser_child_is_grouped() {
    let parent = operator(Precedence::MULTIPLICATION, Associativity::Both);
    assert!(needs_grouping(&parent, Precedence::ADDITION, OperandPosition::Left));
    assert!(needs_grouping(&parent, Precedence::ADDITION, OperandPosition::Right));
    assert!(!needs_grouping(&parent, Precedence::POWER, OperandPosition::Left));
    assert!(!needs_grouping(&parent, Precedence::ATOM, OperandPosition::Right));
}

#[test]
fn test_equal_precedence_follows_associativity() {
    let subtraction = operator(Precedence::ADDITION, Associativity::Left);
    assert!(!needs_grouping(&subtraction, Precedence::ADDITION, OperandPosition::Left));
    assert!(needs_grouping(&subtraction, Precedence::ADDITION, OperandPosition::Right));

    let power = operator(Precedence::POWER, Associativity::Right);
    assert!(needs_grouping(&power, Precedence::POWER, OperandPosition::Left));
    assert!(!needs_grouping(&power, Precedence::POWER, OperandPosition::Right));

    let relational = operator(Precedence::RELATIONAL, Associativity::None);
    assert!(needs_grouping(&relational, Precedence::RELATIONAL, OperandPosition::Left));
    assert!(needs_grouping(&relational, Precedence::RELATIONAL, OperandPosition::Right));
}

#[test]
fn test_rule_over_the_whole_ladder() {
    for parent in Precedence::LADDER {
        let kind = operator(parent, Associativity::Both);
        for child in Precedence::LADDER {
            assert_eq!(
                needs_grouping(&kind, child, OperandPosition::Left),
                child < parent,
                "parent {parent:?}, child {child:?}"
            );
        }
    }
}

// Rendering

#[test]
fn test_sum_under_product_is_parenthesized() {
    assert_eq!(
        emit("Cpp", "Root(Multiplication(Addition(1, 2), 3))"),
        "(1+2)*3;\n"
    );
    assert_eq!(
        emit("LaTeX", "Multiplication(Addition(1, 2), 3)"),
        "\\left(1+2\\right) \\cdot 3"
    );
}

#[test]
fn test_product_under_sum_is_not() {
    assert_eq!(emit("Cpp", "Root(Addition(Multiplication(1, 2), 3))"), "1*2+3;\n");
}

#[test]
fn test_subtraction_on_the_right_is_grouped() {
    assert_eq!(
        emit("Cpp", "Root(Subtraction(a, Subtraction(b, c)))"),
        "v_a-(v_b-v_c);\n"
    );
    assert_eq!(
        emit("Cpp", "Root(Subtraction(Subtraction(a, b), c))"),
        "v_a-v_b-v_c;\n"
    );
}

#[test]
fn test_native_signs_never_fuse() {
    assert_eq!(emit("Cpp", "Root(Subtraction(x, Negation(y)))"), "v_x- -v_y;\n");
    assert_eq!(emit("Cpp", "Root(Negation(Negation(x)))"), "- -v_x;\n");
    assert_eq!(emit("Cpp", "Root(Addition(x, Negation(y)))"), "v_x+-v_y;\n");
    assert_eq!(emit("Cpp", "Root(Negation(x))"), "-v_x;\n");
}

#[test]
fn test_negative_literal_after_minus() {
    let registry = Registry::with_builtins();
    let mut tree = ElementTree::new();
    let root = tree.alloc(registry.create_element("Root").unwrap());
    let difference = tree.alloc(registry.create_element("Subtraction").unwrap());
    let x = tree.alloc(registry.create_element("Variable").unwrap().with_text("x"));
    let literal = tree.alloc(
        registry
            .create_element("Literal")
            .unwrap()
            .with_declared_type(ValueType::Integer)
            .with_text("-1"),
    );
    tree.append_child(root, difference).unwrap();
    tree.append_child(difference, x).unwrap();
    tree.append_child(difference, literal).unwrap();
    tree.set_root(root);

    assert_eq!(emit_tree(&registry, "Cpp", &tree), "v_x- -1;\n");
}

#[test]
fn test_native_logical_not_encloses_its_operand() {
    assert_eq!(emit("Cpp", "Root(LogicalNot(Equal(a, b)))"), "!(v_a==v_b);\n");
    assert_eq!(
        emit("Cpp", "Root(LogicalAnd(LogicalNot(a), b))"),
        "!(v_a) && v_b;\n"
    );
}

#[test]
fn test_native_division_is_a_real_division_call() {
    assert_eq!(emit("Cpp", "Root(Division(1, 2))"), "Model::divide(1, 2);\n");
    assert_eq!(
        emit("Cpp", "Root(Multiplication(3, Division(2, 3)))"),
        "3*Model::divide(2, 3);\n"
    );
    assert_eq!(
        emit("Cpp", "Root(Division(Multiplication(a, b), Addition(c, 1)))"),
        "Model::divide(v_a*v_b, v_c+1);\n"
    );
}

#[test]
fn test_power_on_the_left_is_grouped() {
    assert_eq!(
        emit("LaTeX", "Power(Power(a, b), c)"),
        "{\\left({a}^{b}\\right)}^{c}"
    );
    assert_eq!(emit("LaTeX", "Power(a, Power(b, c))"), "{a}^{{b}^{c}}");
}

#[test]
fn test_markup_rows_wrap_operators() {
    assert_eq!(
        emit("HTML", "Addition(x, 1)"),
        "<mrow><mi>x</mi><mo>+</mo><mn>1</mn></mrow>"
    );
    assert_eq!(
        emit("HTML", "Division(1, Addition(x, 1))"),
        "<mrow><mfrac><mn>1</mn><mrow><mi>x</mi><mo>+</mo><mn>1</mn></mrow></mfrac></mrow>"
    );
}

#[test]
fn test_explicit_grouping_uses_format_style() {
    assert_eq!(emit("LaTeX", "Parenthesis{brackets}(x)"), "\\left[x\\right]");
    assert_eq!(emit("Cpp", "Root(Parenthesis{braces}(x))"), "(v_x);\n");
}

#[test]
fn test_function_arguments_are_never_grouped() {
    assert_eq!(
        emit("Cpp", "Root(Power(Addition(a, b), 2))"),
        "Model::pow(v_a+v_b, 2);\n"
    );
}

// Promotion

#[test]
fn test_promotion_examples() {
    assert_eq!(promote(ValueType::Integer, ValueType::Real), ValueType::Real);
    assert_eq!(promote(ValueType::Boolean, ValueType::Complex), ValueType::Complex);
    assert_eq!(
        promote(ValueType::MatrixInteger, ValueType::Real),
        ValueType::MatrixReal
    );
    assert_eq!(promote(ValueType::Set, ValueType::Integer), ValueType::Variant);
    assert_eq!(promote(ValueType::Tuple, ValueType::Tuple), ValueType::Tuple);
    assert_eq!(promote(ValueType::None, ValueType::Set), ValueType::Set);
    assert_eq!(promote(ValueType::Variant, ValueType::None), ValueType::Variant);
}

#[test]
fn test_inferred_types() {
    let registry = Registry::with_builtins();
    let infer = |source: &str| {
        let tree = parse_notation(source, &registry).unwrap();
        infer_value_type(tree.root_cursor().unwrap())
    };
    assert_eq!(infer("Addition(1, 2)"), ValueType::Integer);
    assert_eq!(infer("Addition(1, 2.5)"), ValueType::Real);
    assert_eq!(infer("Division(1, 2)"), ValueType::Real);
    assert_eq!(infer("Negation(2i)"), ValueType::Complex);
    assert_eq!(infer("LessThan(1, 2)"), ValueType::Boolean);
    assert_eq!(infer("Matrix[1, 2; 3, 4]"), ValueType::MatrixInteger);
    assert_eq!(infer("Multiplication(Matrix[1, 2; 3, 4], 0.5)"), ValueType::MatrixReal);
}
