use serde_json::Value;

use super::{OutputField, python_str};

/// Integer outputs pass through untouched; every other type becomes a quoted
/// string literal.
pub struct OutputParser<'a> {
    field: &'a OutputField,
}

impl<'a> OutputParser<'a> {
    pub fn new(field: &'a OutputField) -> Self {
        OutputParser { field }
    }

    pub fn parse(&self, value: &Value) -> Value {
        if self.field.field_type == "int" {
            return value.clone();
        }
        Value::String(format!("\"{}\"", python_str(value)))
    }
}
