//! Native forward declarations for customer runtime libraries.
//!
//! Vendor libraries are declared by the model API header. A customer
//! library only ships a binary, so the host generates a header from the
//! function records that name it and stores it as the library's
//! declaration payload.

use std::fmt::Write as _;

use quire_codegen::builtins::{native_parameter_type, native_type, MODEL_HEADER};
use quire_codegen::FunctionRecord;

/// Leading parameter of functions that draw random numbers.
const RNG_PARAMETER: &str = "Model::Rng& rng";

/// One overload per variant, in record order.
pub fn synthesize<'a>(library: &str, functions: impl IntoIterator<Item = &'a FunctionRecord>) -> String {
    let mut out = String::with_capacity(1024);
    let _ = writeln!(out, "// Declarations for runtime library '{library}'.");
    out.push_str("#pragma once\n");
    let _ = writeln!(out, "#include \"{MODEL_HEADER}\"\n");

    for record in functions {
        for variant in &record.variants {
            let mut parameters = Vec::with_capacity(variant.parameters.len() + 1);
            if record.requires_rng {
                parameters.push(RNG_PARAMETER.to_string());
            }
            for (index, parameter) in variant.parameters.iter().enumerate() {
                parameters.push(format!(
                    "{} p{index}",
                    native_parameter_type(parameter.value_type)
                ));
            }
            let _ = writeln!(
                out,
                "{} {}({});",
                native_type(variant.return_type),
                record.internal_name,
                parameters.join(", ")
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quire_codegen::{FunctionVariant, Parameter};
    use quire_tree::ValueType;

    use super::*;

    #[test]
    fn test_overloads_and_rng_parameter() {
        let mean = FunctionRecord::new("acme_mean", "acme", "mean")
            .with_variant(FunctionVariant::new(
                ValueType::Real,
                vec![Parameter::new(ValueType::MatrixReal, "sample")],
            ))
            .with_variant(FunctionVariant::new(
                ValueType::Complex,
                vec![Parameter::new(ValueType::MatrixComplex, "sample")],
            ));
        let noise = FunctionRecord::new("acme_noise", "acme", "noise")
            .with_rng()
            .with_variant(FunctionVariant::new(
                ValueType::Real,
                vec![Parameter::new(ValueType::Real, "scale")],
            ));

        let expected = "\
// Declarations for runtime library 'acme'.
#pragma once
#include \"model_api.h\"

Model::Real acme_mean(const Model::MatrixReal& p0);
Model::Complex acme_mean(const Model::MatrixComplex& p0);
Model::Real acme_noise(Model::Rng& rng, Model::Real p0);
";
        assert_eq!(synthesize("acme", [&mean, &noise]), expected);
    }
}
