//! JSON schema every stored decision table must satisfy before it is compiled.

use std::sync::OnceLock;

use jsonschema::Validator;
use serde_json::{Value, json};

use super::DecisionTableError;

fn field_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "id": {"type": "string"},
                "desc": {"type": "string"},
                "from": {"type": "string"},
                "name": {"type": "string"},
                "tips": {"type": "string"},
                "type": {"type": "string"},
                "options": {"type": "object"},
            },
        },
    })
}

pub fn decision_table_schema() -> Value {
    json!({
        "type": "object",
        "required": ["inputs", "outputs", "records"],
        "properties": {
            "inputs": field_schema(),
            "outputs": field_schema(),
            "records": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "inputs": {"type": "object"},
                        "outputs": {"type": "object"},
                    },
                },
            },
        },
    })
}

fn validator() -> Result<&'static Validator, DecisionTableError> {
    static VALIDATOR: OnceLock<Result<Validator, String>> = OnceLock::new();
    VALIDATOR
        .get_or_init(|| Validator::new(&decision_table_schema()).map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|message| DecisionTableError::Schema {
            path: String::new(),
            message: message.clone(),
        })
}

/// Check `table` against the schema, reporting the first violation.
pub fn validate_table(table: &Value) -> Result<(), DecisionTableError> {
    match validator()?.iter_errors(table).next() {
        Some(e) => Err(DecisionTableError::Schema {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_table_is_valid() {
        let table = json!({"inputs": [], "outputs": [], "records": []});
        assert!(validate_table(&table).is_ok());
    }

    #[test]
    fn missing_records_is_rejected() {
        let err = validate_table(&json!({"inputs": [], "outputs": []})).unwrap_err();
        assert!(matches!(err, DecisionTableError::Schema { .. }));
        assert!(err.to_string().contains("records"));
    }

    #[test]
    fn violation_reports_its_path() {
        let table = json!({"inputs": [{"id": 1}], "outputs": [], "records": []});
        let DecisionTableError::Schema { path, .. } = validate_table(&table).unwrap_err() else {
            panic!("expected a schema error");
        };
        assert_eq!(path, "/inputs/0/id");
    }
}
