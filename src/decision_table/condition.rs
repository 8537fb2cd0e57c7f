//! Condition dialects of a decision-table record.
//!
//! * `common`: one condition per input column, bound by position
//! * `or_and`: a two-level `operator`/`conditions` tree naming fields by id
//! * `expression`: a ready-made boolean expression string

use std::collections::HashMap;

use serde_json::Value;

use super::{DecisionTableError, InputField, InputRow, RightOperationParser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Common,
    OrAnd,
    Expression,
}

impl RecordKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "common" => Some(RecordKind::Common),
            "or_and" => Some(RecordKind::OrAnd),
            "expression" => Some(RecordKind::Expression),
            _ => None,
        }
    }

    /// Compile `conditions` with the parser for this dialect.
    pub fn parse(
        self,
        conditions: &Value,
        input_fields: &[InputField],
    ) -> Result<InputRow, DecisionTableError> {
        match self {
            RecordKind::Common => CommonConditionParser::new(input_fields).parse(conditions),
            RecordKind::OrAnd => OrAndConditionParser::new(input_fields).parse(conditions),
            RecordKind::Expression => ExpressionParser.parse(conditions),
        }
    }
}

pub trait ConditionParser {
    fn parse(&self, conditions: &Value) -> Result<InputRow, DecisionTableError>;
}

/// The i-th condition compiles against the i-th input field, in short form.
pub struct CommonConditionParser<'a> {
    input_fields: &'a [InputField],
}

impl<'a> CommonConditionParser<'a> {
    pub fn new(input_fields: &'a [InputField]) -> Self {
        CommonConditionParser { input_fields }
    }
}

impl ConditionParser for CommonConditionParser<'_> {
    fn parse(&self, conditions: &Value) -> Result<InputRow, DecisionTableError> {
        let cells = array(conditions, "common conditions")?
            .iter()
            .enumerate()
            .map(|(i, condition)| {
                let field = self.input_fields.get(i).ok_or_else(|| {
                    DecisionTableError::UnknownField(format!("#{} (only {} inputs)", i, self.input_fields.len()))
                })?;
                RightOperationParser::new(&field.id, false)
                    .parse(str_at(condition, "compare")?, right_obj(condition)?)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(InputRow::Cells(cells))
    }
}

/// Each leaf names its field through `left.obj.key` and compiles in full form.
pub struct OrAndConditionParser<'a> {
    fields_by_id: HashMap<&'a str, &'a InputField>,
}

impl<'a> OrAndConditionParser<'a> {
    pub fn new(input_fields: &'a [InputField]) -> Self {
        OrAndConditionParser {
            fields_by_id: input_fields.iter().map(|f| (f.id.as_str(), f)).collect(),
        }
    }

    fn parse_group(&self, group: &Value) -> Result<String, DecisionTableError> {
        let operator = str_at(group, "operator")?;
        let parts = array_at(group, "conditions")?
            .iter()
            .map(|leaf| {
                let key = leaf
                    .pointer("/left/obj/key")
                    .and_then(Value::as_str)
                    .ok_or_else(|| malformed(leaf, "left.obj.key"))?;
                let field = self
                    .fields_by_id
                    .get(key)
                    .ok_or_else(|| DecisionTableError::UnknownField(key.to_string()))?;
                RightOperationParser::new(&field.id, true)
                    .parse(str_at(leaf, "compare")?, right_obj(leaf)?)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(format!("({})", parts.join(&format!(" {} ", operator))))
    }
}

impl ConditionParser for OrAndConditionParser<'_> {
    fn parse(&self, conditions: &Value) -> Result<InputRow, DecisionTableError> {
        let operator = str_at(conditions, "operator")?;
        let groups = array_at(conditions, "conditions")?
            .iter()
            .map(|group| self.parse_group(group))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(InputRow::Expression(groups.join(&format!(" {} ", operator))))
    }
}

pub struct ExpressionParser;

impl ConditionParser for ExpressionParser {
    fn parse(&self, conditions: &Value) -> Result<InputRow, DecisionTableError> {
        conditions
            .as_str()
            .map(|expr| InputRow::Expression(expr.to_string()))
            .ok_or_else(|| malformed(conditions, "expression string"))
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn malformed(value: &Value, expected: &str) -> DecisionTableError {
    DecisionTableError::MalformedValue(format!("expected {} in {}", expected, value))
}

fn array<'v>(value: &'v Value, what: &str) -> Result<&'v Vec<Value>, DecisionTableError> {
    value.as_array().ok_or_else(|| malformed(value, what))
}

fn array_at<'v>(value: &'v Value, key: &str) -> Result<&'v Vec<Value>, DecisionTableError> {
    value
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| malformed(value, key))
}

fn str_at<'v>(value: &'v Value, key: &str) -> Result<&'v str, DecisionTableError> {
    value
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(value, key))
}

fn right_obj(condition: &Value) -> Result<&Value, DecisionTableError> {
    condition
        .pointer("/right/obj")
        .ok_or_else(|| malformed(condition, "right.obj"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields() -> Vec<InputField> {
        ["a", "b"]
            .iter()
            .map(|id| {
                InputField::from_meta(&json!({"id": id, "name": id, "type": "string"})).unwrap()
            })
            .collect()
    }

    #[test]
    fn common_binds_by_position() {
        let fields = fields();
        let row = CommonConditionParser::new(&fields)
            .parse(&json!([
                {"compare": "equals", "right": {"obj": {"type": "string", "value": "x"}}},
                {"compare": "not-null", "right": {"obj": {}}},
            ]))
            .unwrap();
        assert_eq!(row, InputRow::Cells(vec!["\"x\"".into(), "b!=null".into()]));
    }

    #[test]
    fn common_with_more_conditions_than_inputs_fails() {
        let fields = fields();
        let conditions = json!([
            {"compare": "is-null", "right": {"obj": {}}},
            {"compare": "is-null", "right": {"obj": {}}},
            {"compare": "is-null", "right": {"obj": {}}},
        ]);
        assert!(matches!(
            CommonConditionParser::new(&fields).parse(&conditions),
            Err(DecisionTableError::UnknownField(_))
        ));
    }

    #[test]
    fn or_and_joins_groups_by_operator() {
        let fields = fields();
        let leaf = |key: &str, value: &str| {
            json!({
                "left": {"obj": {"key": key}},
                "compare": "equals",
                "right": {"obj": {"type": "string", "value": value}},
            })
        };
        let conditions = json!({
            "operator": "or",
            "conditions": [
                {"operator": "and", "conditions": [leaf("a", "1"), leaf("b", "2")]},
                {"operator": "and", "conditions": [leaf("b", "3")]},
            ],
        });
        let row = OrAndConditionParser::new(&fields).parse(&conditions).unwrap();
        assert_eq!(
            row,
            InputRow::Expression("(a=\"1\" and b=\"2\") or (b=\"3\")".into())
        );
    }

    #[test]
    fn or_and_unknown_field_fails() {
        let fields = fields();
        let conditions = json!({
            "operator": "and",
            "conditions": [{"operator": "and", "conditions": [
                {"left": {"obj": {"key": "zz"}}, "compare": "not-null", "right": {"obj": {}}}
            ]}],
        });
        assert_eq!(
            OrAndConditionParser::new(&fields).parse(&conditions),
            Err(DecisionTableError::UnknownField("zz".into()))
        );
    }

    #[test]
    fn expression_passes_through() {
        assert_eq!(
            ExpressionParser.parse(&json!("a=2")).unwrap(),
            InputRow::Expression("a=2".into())
        );
        assert!(ExpressionParser.parse(&json!(2)).is_err());
    }
}
