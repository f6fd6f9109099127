// Boundary error types.
//
// Analyzers never fail outright. These errors are raised at the edges (parsing
// one timestamp, checking the shape of one JSON section) and converted into
// diagnostics by the caller.

use thiserror::Error;

/// A single timestamp string could not be turned into an instant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimestampError {
    #[error("timestamp is empty")]
    Empty,
    #[error("unrecognized timestamp format: {0:?}")]
    Unrecognized(String),
}

/// The top-level container handed to an analyzer has the wrong JSON type.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("expected {expected}, found {found}")]
pub struct ShapeError {
    pub expected: &'static str,
    pub found: &'static str,
}

impl ShapeError {
    pub fn new(expected: &'static str, value: &serde_json::Value) -> Self {
        Self {
            expected,
            found: json_type_name(value),
        }
    }
}

/// Human-readable JSON type name, used in diagnostics.
pub fn json_type_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
