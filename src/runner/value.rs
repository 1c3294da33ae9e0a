//! Typed option values
//!
//! Values travel through the option scope as canonical strings; the types
//! here govern parsing of flag and environment input, the zero value used
//! when nothing resolves, and the canonical form used for interpolation and
//! equality checks.

use crate::error::{ExecutionError, ExecutionResult};

/// Option value types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    String,
    Integer,
    Float,
    Boolean,
}

impl OptionType {
    /// Map a configuration type name to its type
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(OptionType::String),
            "int" | "integer" => Some(OptionType::Integer),
            "float" => Some(OptionType::Float),
            "bool" | "boolean" => Some(OptionType::Boolean),
            _ => None,
        }
    }

    /// The value used when an option is unresolved and has no default
    pub fn zero(&self) -> &'static str {
        match self {
            OptionType::String => "",
            OptionType::Integer => "0",
            OptionType::Float => "0",
            OptionType::Boolean => "false",
        }
    }

    /// Parse a flag or environment value into its canonical string form
    pub fn parse(&self, name: &str, input: &str) -> ExecutionResult<String> {
        match self {
            OptionType::String => Ok(input.to_string()),
            OptionType::Integer => input
                .trim()
                .parse::<i64>()
                .map(|n| n.to_string())
                .map_err(|_| ExecutionError::TypeMismatch {
                    name: name.to_string(),
                    value: input.to_string(),
                    expected: "integer",
                }),
            OptionType::Float => input
                .trim()
                .parse::<f64>()
                .map(|f| f.to_string())
                .map_err(|_| ExecutionError::TypeMismatch {
                    name: name.to_string(),
                    value: input.to_string(),
                    expected: "float",
                }),
            OptionType::Boolean => parse_bool(input)
                .map(|b| b.to_string())
                .ok_or_else(|| ExecutionError::TypeMismatch {
                    name: name.to_string(),
                    value: input.to_string(),
                    expected: "boolean",
                }),
        }
    }
}

fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Canonical string form of a YAML scalar
///
/// Booleans lowercase, numbers in Rust's shortest form, strings verbatim.
/// Non-scalar values have no canonical form.
pub fn scalar_string(value: &serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value;

    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(|f| f.to_string())
            }
        }
        _ => None,
    }
}
