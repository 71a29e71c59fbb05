//! Scalar value decoders.
//!
//! A decoder turns the raw spelling stored on a literal into display text
//! under an optional [`Format`]. Decoders know nothing about backends; the
//! markup translators wrap whatever they return.

use quire_tree::{Format, ValueType};

/// Shown in place of a value that cannot be decoded under its type.
pub const PLACEHOLDER: &str = "???";

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("'{raw}' is not a valid {expected} value")]
    Malformed { raw: String, expected: ValueType },
}

/// Converts one value type's raw spelling into display text.
pub trait Decoder: Send + Sync {
    fn decode(&self, raw: &str, format: Option<&Format>) -> Result<String, DecodeError>;
}

pub struct BooleanDecoder;
pub struct IntegerDecoder;
pub struct RealDecoder;
pub struct ComplexDecoder;

pub static BOOLEAN: BooleanDecoder = BooleanDecoder;
pub static INTEGER: IntegerDecoder = IntegerDecoder;
pub static REAL: RealDecoder = RealDecoder;
pub static COMPLEX: ComplexDecoder = ComplexDecoder;

impl Decoder for BooleanDecoder {
    fn decode(&self, raw: &str, _format: Option<&Format>) -> Result<String, DecodeError> {
        parse_boolean(raw)
            .map(|value| value.to_string())
            .ok_or_else(|| malformed(raw, ValueType::Boolean))
    }
}

impl Decoder for IntegerDecoder {
    fn decode(&self, raw: &str, _format: Option<&Format>) -> Result<String, DecodeError> {
        parse_integer(raw)
            .map(|value| value.to_string())
            .ok_or_else(|| malformed(raw, ValueType::Integer))
    }
}

impl Decoder for RealDecoder {
    fn decode(&self, raw: &str, format: Option<&Format>) -> Result<String, DecodeError> {
        let value = parse_real(raw).ok_or_else(|| malformed(raw, ValueType::Real))?;
        Ok(format_real(value, precision(format)))
    }
}

impl Decoder for ComplexDecoder {
    fn decode(&self, raw: &str, format: Option<&Format>) -> Result<String, DecodeError> {
        let (re, im) = parse_complex(raw).ok_or_else(|| malformed(raw, ValueType::Complex))?;
        let digits = precision(format);
        let imaginary = format_real(im.abs(), digits);
        Ok(match (re == 0.0, im == 0.0) {
            (_, true) => format_real(re, digits),
            (true, false) if im < 0.0 => format!("-{imaginary}i"),
            (true, false) => format!("{imaginary}i"),
            (false, false) => {
                let sign = if im < 0.0 { '-' } else { '+' };
                format!("{}{sign}{imaginary}i", format_real(re, digits))
            }
        })
    }
}

fn malformed(raw: &str, expected: ValueType) -> DecodeError {
    DecodeError::Malformed {
        raw: raw.to_string(),
        expected,
    }
}

fn precision(format: Option<&Format>) -> Option<usize> {
    format
        .and_then(|f| f.precision)
        .and_then(|p| usize::try_from(p).ok())
}

fn format_real(value: f64, precision: Option<usize>) -> String {
    match precision {
        Some(digits) => format!("{value:.digits$}"),
        None => value.to_string(),
    }
}

pub fn parse_boolean(raw: &str) -> Option<bool> {
    match raw.trim() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

pub fn parse_integer(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

pub fn parse_real(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse `a`, `bi`, `a+bi` or `a-bi`.
pub fn parse_complex(raw: &str) -> Option<(f64, f64)> {
    let raw = raw.trim();
    let Some(body) = raw.strip_suffix('i') else {
        return parse_real(raw).map(|re| (re, 0.0));
    };
    // The split point is the last sign that is not part of an exponent.
    let split = body
        .char_indices()
        .filter(|&(i, c)| {
            (c == '+' || c == '-') && i > 0 && !body[..i].ends_with(['e', 'E'])
        })
        .map(|(i, _)| i)
        .last();
    match split {
        Some(i) => {
            let re = parse_real(&body[..i])?;
            let im = parse_imaginary(&body[i..])?;
            Some((re, im))
        }
        None => Some((0.0, parse_imaginary(body)?)),
    }
}

fn parse_imaginary(coefficient: &str) -> Option<f64> {
    match coefficient {
        "" | "+" => Some(1.0),
        "-" => Some(-1.0),
        other => parse_real(other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests can panic")]
mod tests {
    use super::*;

    #[test]
    fn test_integer() {
        assert_eq!(INTEGER.decode("42", None).unwrap(), "42");
        assert!(INTEGER.decode("1.5", None).is_err());
    }

    #[test]
    fn test_real_precision() {
        let format = Format::new().with_precision(2);
        assert_eq!(REAL.decode("3.14159", Some(&format)).unwrap(), "3.14");
        assert_eq!(REAL.decode("2.5", None).unwrap(), "2.5");
        assert!(REAL.decode("abc", None).is_err());
    }

    #[test]
    fn test_boolean() {
        assert_eq!(BOOLEAN.decode("true", None).unwrap(), "true");
        assert_eq!(
            BOOLEAN.decode("yes", None),
            Err(DecodeError::Malformed {
                raw: "yes".to_string(),
                expected: ValueType::Boolean
            })
        );
    }

    #[test]
    fn test_complex_forms() {
        assert_eq!(parse_complex("2i"), Some((0.0, 2.0)));
        assert_eq!(parse_complex("1+2i"), Some((1.0, 2.0)));
        assert_eq!(parse_complex("1.5-i"), Some((1.5, -1.0)));
        assert_eq!(parse_complex("-3"), Some((-3.0, 0.0)));
        assert_eq!(parse_complex("1e-3+2i"), Some((0.001, 2.0)));
        assert_eq!(parse_complex("x+2i"), None);
    }

    #[test]
    fn test_complex_display() {
        assert_eq!(COMPLEX.decode("2i", None).unwrap(), "2i");
        assert_eq!(COMPLEX.decode("1-2i", None).unwrap(), "1-2i");
        let format = Format::new().with_precision(1);
        assert_eq!(COMPLEX.decode("0.24+0.76i", Some(&format)).unwrap(), "0.2+0.8i");
    }
}
