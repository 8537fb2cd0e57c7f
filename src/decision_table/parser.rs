use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use super::schema::validate_table;
use super::{Column, DecisionTableError, InputField, OutputField, OutputParser, RecordKind};
use crate::config::DecisionTableSettings;

/// One compiled record on the input side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputRow {
    /// One unary test per input column, in column order.
    Cells(Vec<String>),
    /// A boolean expression over all inputs.
    Expression(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledInputs {
    pub cols: Vec<Column>,
    pub rows: Vec<InputRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledOutputs {
    pub cols: Vec<Column>,
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledTable {
    pub title: String,
    pub hit_policy: String,
    pub inputs: CompiledInputs,
    pub outputs: CompiledOutputs,
}

/// Compiles a stored decision table. The source table is never modified;
/// every call to [`parse`](Self::parse) builds a fresh [`CompiledTable`].
#[derive(Debug, Clone)]
pub struct DecisionTableParser {
    title: String,
    table: Value,
    hit_policy: String,
}

impl DecisionTableParser {
    pub fn new(
        title: impl Into<String>,
        table: Value,
        hit_policy: impl Into<String>,
        validate: bool,
    ) -> Result<Self, DecisionTableError> {
        let parser = DecisionTableParser {
            title: title.into(),
            table,
            hit_policy: hit_policy.into(),
        };
        if validate {
            parser.validate()?;
        }
        Ok(parser)
    }

    pub fn from_settings(
        title: impl Into<String>,
        table: Value,
        settings: &DecisionTableSettings,
    ) -> Result<Self, DecisionTableError> {
        Self::new(title, table, settings.hit_policy.clone(), settings.validate_schema)
    }

    pub fn validate(&self) -> Result<(), DecisionTableError> {
        validate_table(&self.table).inspect_err(|e| {
            error!(title = %self.title, "{}", e);
        })
    }

    pub fn parse(&self) -> Result<CompiledTable, DecisionTableError> {
        let input_fields = self.fields("inputs")?;
        let output_fields = self.fields("outputs")?;
        let records = self.section("records");

        let mut input_rows = Vec::with_capacity(records.len());
        let mut output_rows = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            input_rows.push(self.parse_record_inputs(record, &input_fields)?);
            output_rows.push(parse_record_outputs(index, record, &output_fields)?);
        }
        debug!(title = %self.title, records = records.len(), "compiled decision table");

        Ok(CompiledTable {
            title: self.title.clone(),
            hit_policy: self.hit_policy.clone(),
            inputs: CompiledInputs {
                cols: input_fields.iter().map(InputField::column).collect(),
                rows: input_rows,
            },
            outputs: CompiledOutputs {
                cols: output_fields.iter().map(OutputField::column).collect(),
                rows: output_rows,
            },
        })
    }

    fn section(&self, key: &str) -> &[Value] {
        self.table
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn fields(&self, key: &str) -> Result<Vec<InputField>, DecisionTableError> {
        self.section(key).iter().map(InputField::from_meta).collect()
    }

    fn parse_record_inputs(
        &self,
        record: &Value,
        input_fields: &[InputField],
    ) -> Result<InputRow, DecisionTableError> {
        let inputs = record.get("inputs").unwrap_or(&Value::Null);
        let tag = inputs.get("type").and_then(Value::as_str).unwrap_or_default();
        let Some(kind) = RecordKind::from_tag(tag) else {
            let err = DecisionTableError::UnsupportedRecordType(tag.to_string());
            error!(title = %self.title, "{}", err);
            return Err(err);
        };
        kind.parse(
            inputs.get("conditions").unwrap_or(&Value::Null),
            input_fields,
        )
    }
}

fn parse_record_outputs(
    index: usize,
    record: &Value,
    output_fields: &[OutputField],
) -> Result<Vec<Value>, DecisionTableError> {
    output_fields
        .iter()
        .map(|field| {
            record
                .get("outputs")
                .and_then(|outputs| outputs.get(&field.id))
                .map(|value| OutputParser::new(field).parse(value))
                .ok_or_else(|| DecisionTableError::MissingOutput {
                    record: index,
                    field: field.id.clone(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(records: Value) -> Value {
        json!({
            "inputs": [{"id": "n", "name": "n", "type": "int"}],
            "outputs": [
                {"id": "label", "name": "label", "type": "string"},
                {"id": "score", "name": "score", "type": "int"},
            ],
            "records": records,
        })
    }

    #[test]
    fn compiles_inputs_and_outputs() {
        let table = table(json!([{
            "inputs": {"type": "common", "conditions": [
                {"compare": "greater-than", "right": {"obj": {"type": "int", "value": "3"}}}
            ]},
            "outputs": {"label": "big", "score": "10"},
        }]));
        let compiled = DecisionTableParser::new("t", table, "Unique", true)
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(compiled.inputs.rows, vec![InputRow::Cells(vec![">3".into()])]);
        assert_eq!(compiled.outputs.rows, vec![vec![json!("\"big\""), json!("10")]]);
        assert_eq!(compiled.inputs.cols[0].id, "n");
        assert_eq!(compiled.hit_policy, "Unique");
    }

    #[test]
    fn unknown_record_type_fails() {
        let table = table(json!([{
            "inputs": {"type": "fuzzy", "conditions": []},
            "outputs": {"label": "x", "score": 1},
        }]));
        let err = DecisionTableParser::new("t", table, "Unique", true)
            .unwrap()
            .parse()
            .unwrap_err();
        assert_eq!(err, DecisionTableError::UnsupportedRecordType("fuzzy".into()));
        assert_eq!(
            err.to_string(),
            "[parse decision table error]: can not get record type of fuzzy"
        );
    }

    #[test]
    fn missing_output_value_fails() {
        let table = table(json!([{
            "inputs": {"type": "expression", "conditions": "n=1"},
            "outputs": {"label": "x"},
        }]));
        let err = DecisionTableParser::new("t", table, "Unique", true)
            .unwrap()
            .parse()
            .unwrap_err();
        assert_eq!(
            err,
            DecisionTableError::MissingOutput {
                record: 0,
                field: "score".into()
            }
        );
    }

    #[test]
    fn schema_validation_can_be_skipped() {
        let bad = json!({"inputs": []});
        assert!(DecisionTableParser::new("t", bad.clone(), "Unique", true).is_err());

        let parser = DecisionTableParser::new("t", bad, "Unique", false).unwrap();
        let compiled = parser.parse().unwrap();
        assert!(compiled.inputs.rows.is_empty());
    }

    #[test]
    fn settings_supply_defaults() {
        let settings = DecisionTableSettings::default();
        let parser = DecisionTableParser::from_settings("t", table(json!([])), &settings).unwrap();
        assert_eq!(parser.parse().unwrap().hit_policy, "Unique");
    }
}
