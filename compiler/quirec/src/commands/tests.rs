#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;

use quire_codegen::builtins::{HTML, NATIVE};
use quire_codegen::{FunctionRecord, FunctionVariant, Parameter};
use quire_tree::ValueType;

use super::*;

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

#[test]
fn test_emit_defaults() {
    let options = parse_emit_options(&args(&["model.qt"])).unwrap();
    assert_eq!(options.input, PathBuf::from("model.qt"));
    assert_eq!(options.backend, NATIVE);
    assert_eq!(options.output, None);
    assert_eq!(options.generator, GeneratorOptions::default());
    assert_eq!(options.common, CommonOptions::default());
}

#[test]
fn test_emit_options_in_any_order() {
    let options = parse_emit_options(&args(&[
        "--backend=HTML",
        "--title=Orbit",
        "model.qt",
        "--fragment",
        "--indent=2",
        "--plugins=/opt/quire",
        "--output=out.html",
    ]))
    .unwrap();
    assert_eq!(options.backend, HTML);
    assert_eq!(options.output, Some(PathBuf::from("out.html")));
    assert_eq!(options.generator.title.as_deref(), Some("Orbit"));
    assert_eq!(options.generator.indent, 2);
    assert!(!options.generator.standalone);
    assert_eq!(options.common.plugin_dirs, vec![PathBuf::from("/opt/quire")]);
}

#[test]
fn test_emit_rejects_bad_input() {
    for bad in [
        args(&[]),
        args(&["a.qt", "b.qt"]),
        args(&["a.qt", "--indent=wide"]),
        args(&["a.qt", "--verbose"]),
        args(&["a.qt", "--backend=all", "--output=x"]),
    ] {
        assert!(
            matches!(parse_emit_options(&bad), Err(CliError::Usage(_))),
            "{bad:?}"
        );
    }
}

#[test]
fn test_common_options_positional() {
    let (values, common) =
        parse_common_options(&args(&["acme", "--no-env-plugins"]), 1).unwrap();
    assert_eq!(values, vec!["acme".to_string()]);
    assert!(common.no_env_path);
    assert!(common.search_dirs().is_empty());

    assert!(parse_common_options(&args(&[]), 1).is_err());
    assert!(parse_common_options(&args(&["acme", "blas"]), 1).is_err());
}

#[test]
fn test_format_functions_groups_by_category() {
    let mut registry = Registry::new();
    let mut mean = FunctionRecord::new("acme_mean", "acme", "mean").with_variant(
        FunctionVariant::new(
            ValueType::Real,
            vec![Parameter::new(ValueType::MatrixReal, "sample")],
        ),
    );
    mean.category = "Statistics".to_string();
    let sin = FunctionRecord::new("sin", "core", "sin").with_variant(FunctionVariant::new(
        ValueType::Real,
        vec![Parameter::new(ValueType::Real, "x")],
    ));
    assert!(registry.register_function(mean));
    assert!(registry.register_function(sin));

    let expected = format!(
        "Statistics:\n  mean [acme] {desc}\n      ({matrix}) -> {real}\n\
         User Defined:\n  sin [core] {desc}\n      ({real}) -> {real}\n",
        desc = quire_codegen::registry::DEFAULT_DESCRIPTION,
        matrix = ValueType::MatrixReal,
        real = ValueType::Real,
    );
    assert_eq!(format_functions(&registry), expected);
}
