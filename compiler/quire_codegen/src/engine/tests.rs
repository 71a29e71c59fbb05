#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use std::sync::Arc;

use pretty_assertions::assert_eq;
use quire_tree::{parse_notation, Anchor, Element, ElementKind, ElementTree, ValueType};

use super::*;
use crate::builtins::{HTML, LATEX, NATIVE};
use crate::registry::{
    FunctionRecord, FunctionVariant, LibraryDependency, LibraryKind, LibraryOwner, Parameter,
    RuntimeLibrary,
};
use crate::translator::{EmitPhase, Translator};

fn builtins() -> SharedRegistry<Registry> {
    Registry::with_builtins().freeze()
}

fn generate(
    registry: &SharedRegistry<Registry>,
    backend: &str,
    options: GeneratorOptions,
    source: &str,
) -> Result<GeneratedOutput, GenerationError> {
    let tree = parse_notation(source, &**registry).unwrap();
    Engine::new(registry.clone(), backend, options)?.generate(&tree)
}

fn text(backend: &str, options: GeneratorOptions, source: &str) -> String {
    generate(&builtins(), backend, options, source).unwrap().text
}

/// Writes a fixed native call for the custom element.
struct HistogramNative;

impl Translator for HistogramNative {
    fn translate(
        &self,
        _element: ElementRef<'_>,
        ctx: &mut EmitContext<'_>,
    ) -> Result<(), GenerationError> {
        ctx.write("Model::histogram()");
        Ok(())
    }
}

static HISTOGRAM_NATIVE: HistogramNative = HistogramNative;

fn with_histogram() -> SharedRegistry<Registry> {
    let mut registry = Registry::with_builtins();
    registry.register_element_creator(
        "Histogram",
        Arc::new(|| Element::new("Histogram", ElementKind::leaf(ValueType::MatrixReal))),
        false,
    );
    registry.register_translator(NATIVE, "Histogram", &HISTOGRAM_NATIVE, false);
    registry.freeze()
}

fn with_customer_library() -> SharedRegistry<Registry> {
    let mut registry = Registry::with_builtins();
    registry.register_function(
        FunctionRecord::new("acme_mean", "acme", "mean").with_variant(FunctionVariant::new(
            ValueType::Real,
            vec![Parameter::new(ValueType::Real, "sample")],
        )),
    );
    registry.register_runtime_library(RuntimeLibrary::new(
        "acme",
        LibraryKind::Dynamic,
        LibraryOwner::Customer,
    ));
    registry.register_library_dependencies(
        "acme",
        vec![LibraryDependency::new("acme_core", LibraryKind::Static)],
    );
    registry.freeze()
}

// Native

#[test]
fn test_native_fragment_groups_sum() {
    assert_eq!(
        text(
            NATIVE,
            GeneratorOptions::fragment(),
            "Root(Multiplication(Addition(1, 2), 3))"
        ),
        "(1+2)*3;\n"
    );
}

#[test]
fn test_native_standalone_framing() {
    let expected = "\
// Generated by quire. Do not edit.
#include \"model_api.h\"

Model::Real v_x;

extern \"C\" void model_main()
{
    v_x = 1+2.5;
    v_x*2;
}
";
    assert_eq!(
        text(
            NATIVE,
            GeneratorOptions::default(),
            "Root(Assignment(x, Addition(1, 2.5)), Multiplication(x, 2))"
        ),
        expected
    );
}

#[test]
fn test_native_declares_each_variable_once() {
    let output = generate(
        &builtins(),
        NATIVE,
        GeneratorOptions::fragment(),
        "Root(Assignment(x, 1), Assignment(x, 2), Assignment(y, LessThan(x, 3)))",
    )
    .unwrap();
    assert_eq!(
        output.sections[&EmitPhase::Declarations],
        "Model::Integer v_x;\nModel::Boolean v_y;\n"
    );
    assert_eq!(
        output.sections[&EmitPhase::Body],
        "v_x = 1;\nv_x = 2;\nv_y = v_x<3;\n"
    );
}

#[test]
fn test_native_integer_division_is_real() {
    let output = generate(
        &builtins(),
        NATIVE,
        GeneratorOptions::fragment(),
        "Root(Assignment(x, Division(1, 2)))",
    )
    .unwrap();
    assert_eq!(
        output.text,
        "Model::Real v_x;\nv_x = Model::divide(1, 2);\n"
    );
}

#[test]
fn test_native_customer_function_links_and_includes() {
    let registry = with_customer_library();
    let output = generate(&registry, NATIVE, GeneratorOptions::default(), "Root(mean(x))").unwrap();
    assert!(output.resources.contains(ResourceKind::Header, "acme.h"));
    assert_eq!(output.link_order, vec!["acme", "acme_core"]);
    assert!(output.text.contains("#include \"acme.h\"\n"));
    assert!(output.text.contains("// link: acme acme_core\n"));
    assert!(output.text.contains("    acme_mean(v_x);\n"));
}

#[test]
fn test_native_function_arity_mismatch_fails() {
    let registry = with_customer_library();
    let err = generate(&registry, NATIVE, GeneratorOptions::fragment(), "Root(mean(x, y))")
        .unwrap_err();
    assert!(
        matches!(&err, GenerationError::TranslatorFailed { element_type, .. } if element_type == "FunctionCall"),
        "{err}"
    );
}

#[test]
fn test_native_malformed_literal_fails() {
    let registry = builtins();
    let mut tree = ElementTree::new();
    let root = tree.alloc(registry.create_element("Root").unwrap());
    let literal = tree.alloc(
        registry
            .create_element("Literal")
            .unwrap()
            .with_declared_type(ValueType::Integer)
            .with_text("twelve"),
    );
    tree.append_child(root, literal).unwrap();
    tree.set_root(root);

    let native = Engine::new(registry.clone(), NATIVE, GeneratorOptions::fragment()).unwrap();
    assert_eq!(native.generate(&tree).unwrap_err().element_type(), Some("Literal"));

    // Markup backends show the placeholder instead.
    let html = Engine::new(registry, HTML, GeneratorOptions::fragment()).unwrap();
    assert_eq!(
        html.generate(&tree).unwrap().text,
        "<math display=\"block\"><mtext>???</mtext></math>\n"
    );
}

// Missing translators

#[test]
fn test_missing_translator_names_type_and_backend() {
    let registry = with_histogram();
    let native = generate(&registry, NATIVE, GeneratorOptions::fragment(), "Root(Histogram)");
    assert_eq!(native.unwrap().text, "Model::histogram();\n");

    let err = generate(&registry, HTML, GeneratorOptions::fragment(), "Root(Histogram)").unwrap_err();
    match err {
        GenerationError::MissingTranslator {
            backend,
            element_type,
            ..
        } => {
            assert_eq!(backend, "HTML");
            assert_eq!(element_type, "Histogram");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unknown_backend() {
    let err = Engine::new(builtins(), "Fortran", GeneratorOptions::default())
        .err()
        .unwrap();
    assert_eq!(err, GenerationError::UnknownBackend("Fortran".to_string()));
}

#[test]
fn test_generate_all_keeps_backends_independent() {
    let registry = with_histogram();
    let tree = parse_notation("Root(Addition(Histogram, 1))", &*registry).unwrap();
    let results = generate_all(&registry, &tree, &GeneratorOptions::fragment());
    let outcome: Vec<(&str, bool)> = results
        .iter()
        .map(|(name, result)| (name.as_str(), result.is_ok()))
        .collect();
    assert_eq!(outcome, vec![(NATIVE, true), (HTML, false), (LATEX, false)]);
}

// Markup

#[test]
fn test_html_numbered_paragraphs() {
    assert_eq!(
        text(
            HTML,
            GeneratorOptions::fragment(),
            r#"Root(Paragraph{numbered}("first"), Paragraph{numbered}("second"), Paragraph("after"))"#
        ),
        "<ol>\n    <li>first</li>\n    <li>second</li>\n</ol>\n<p>after</p>\n"
    );
}

#[test]
fn test_html_restarted_list_keeps_its_number() {
    assert_eq!(
        text(
            HTML,
            GeneratorOptions::fragment(),
            r#"Root(Paragraph{numbered=4}("d"), Paragraph{bullet}("x"))"#
        ),
        "<ol start=\"4\">\n    <li>d</li>\n</ol>\n<ul>\n    <li>x</li>\n</ul>\n"
    );
}

#[test]
fn test_html_inline_math_in_paragraph() {
    assert_eq!(
        text(
            HTML,
            GeneratorOptions::fragment(),
            r#"Root(Paragraph("where", Variable:"x", "is <small>"))"#
        ),
        "<p>where <math><mi>x</mi></math> is &lt;small&gt;</p>\n"
    );
}

#[test]
fn test_html_standalone_links_frame_stylesheet() {
    let output = generate(
        &builtins(),
        HTML,
        GeneratorOptions::default().with_title("Notes & Sums"),
        r#"Root(Frame("label"))"#,
    )
    .unwrap();
    assert!(output.resources.contains(ResourceKind::Stylesheet, "quire-frame.css"));
    assert!(output.text.starts_with("<!DOCTYPE html>\n"));
    assert!(output.text.contains("<title>Notes &amp; Sums</title>\n"));
    assert!(output.text.contains("<link rel=\"stylesheet\" href=\"quire-frame.css\">\n"));
    assert!(output.text.ends_with("</body>\n</html>\n"));
}

#[test]
fn test_latex_document() {
    let expected = "\
\\documentclass{article}
\\usepackage{mathtools}
\\title{Notes}
\\begin{document}
\\maketitle
\\[ x \\coloneqq 1 \\]
\\end{document}
";
    assert_eq!(
        text(
            LATEX,
            GeneratorOptions::default().with_title("Notes"),
            "Root(Assignment(x, 1))"
        ),
        expected
    );
}

#[test]
fn test_latex_matrix_requires_amsmath() {
    let output = generate(
        &builtins(),
        LATEX,
        GeneratorOptions::fragment(),
        "Root(Matrix{brackets}[1, 2; 3, 4])",
    )
    .unwrap();
    assert!(output.resources.contains(ResourceKind::Package, "amsmath"));
    assert_eq!(
        output.text,
        "\\[ \\begin{bmatrix} 1 & 2 \\\\ 3 & 4 \\end{bmatrix} \\]\n"
    );
}

#[test]
fn test_latex_escapes_variable_names() {
    assert_eq!(
        text(LATEX, GeneratorOptions::fragment(), r#"Root(Variable:"a%b#")"#),
        "\\[ \\mathit{a\\%b\\#} \\]\n"
    );
    assert_eq!(
        text(LATEX, GeneratorOptions::fragment(), r#"Root(Variable:"%")"#),
        "\\[ \\% \\]\n"
    );
}

#[test]
fn test_latex_frame_at_extreme_anchor() {
    let registry = builtins();
    let mut tree = ElementTree::new();
    let root = tree.alloc(registry.create_element("Root").unwrap());
    let frame = tree.alloc(registry.create_element("Frame").unwrap());
    let label = tree.alloc(registry.create_element("Text").unwrap().with_text("low"));
    tree.append_child(root, frame).unwrap();
    tree.place(frame, label, Anchor { x: 3, y: i32::MIN }).unwrap();
    tree.set_root(root);

    let engine = Engine::new(registry, LATEX, GeneratorOptions::fragment()).unwrap();
    let output = engine.generate(&tree).unwrap();
    assert!(output.text.contains("\\put(3,2147483647){low}\n"));
}

#[test]
fn test_invalid_root() {
    let tree = ElementTree::new();
    let engine = Engine::new(builtins(), LATEX, GeneratorOptions::default()).unwrap();
    assert!(matches!(
        engine.generate(&tree),
        Err(GenerationError::InvalidElement(_))
    ));
}
