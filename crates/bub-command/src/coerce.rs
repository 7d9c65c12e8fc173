use anyhow::{bail, Result};

use crate::catalog::ArgKind;

#[derive(Debug, Clone, PartialEq)]
/// A resolved argument value after explicit coercion.
pub enum ArgValue {
    String(String),
    Number(f64),
    Boolean(bool),
}

/// Coerces a raw string argument into the declared kind. Kept separate from
/// the resolver on purpose: parsing stores strings only, and handlers opt
/// into typed reads where they need them.
pub fn coerce_value(raw: &str, kind: ArgKind) -> Result<ArgValue> {
    match kind {
        ArgKind::String => Ok(ArgValue::String(raw.to_string())),
        ArgKind::Number => match raw.trim().parse::<f64>() {
            Ok(number) if number.is_finite() => Ok(ArgValue::Number(number)),
            _ => bail!("expected a number, got '{raw}'"),
        },
        ArgKind::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(ArgValue::Boolean(true)),
            "false" => Ok(ArgValue::Boolean(false)),
            _ => bail!("expected true or false, got '{raw}'"),
        },
    }
}
