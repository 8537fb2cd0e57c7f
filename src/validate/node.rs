//! Type-tag validators.

use serde_json::Value;

use super::Validator;
use crate::error::ConvertError;
use crate::model::{Constant, ConstantType, Node, NodeType};

/// Asserts a data-model node is of the kind a converter handles.
pub struct NodeTypeValidator {
    expected: NodeType,
}

impl NodeTypeValidator {
    pub fn new(expected: NodeType) -> Self {
        NodeTypeValidator { expected }
    }
}

impl Validator<Node> for NodeTypeValidator {
    fn validate(&self, data: &Node) -> Result<(), ConvertError> {
        if data.node_type() != self.expected {
            return Err(ConvertError::validate(
                "C001",
                format!(
                    "Node '{}' has type '{}', expected '{}'",
                    data.id(),
                    data.node_type(),
                    self.expected
                ),
                Some(data.id().to_string()),
            ));
        }
        Ok(())
    }
}

pub struct ConstantTypeValidator {
    expected: ConstantType,
}

impl ConstantTypeValidator {
    pub fn new(expected: ConstantType) -> Self {
        ConstantTypeValidator { expected }
    }
}

impl Validator<Constant> for ConstantTypeValidator {
    fn validate(&self, data: &Constant) -> Result<(), ConvertError> {
        if data.constant_type() != self.expected {
            return Err(ConvertError::validate(
                "C001",
                format!(
                    "Constant '{}' has type '{}', expected '{}'",
                    data.key(),
                    data.constant_type(),
                    self.expected
                ),
                None,
            ));
        }
        Ok(())
    }
}

/// Asserts a raw JSON object's `type` field equals the expected tag.
pub struct JsonTypeTagValidator {
    expected: &'static str,
}

impl JsonTypeTagValidator {
    pub fn new(expected: &'static str) -> Self {
        JsonTypeTagValidator { expected }
    }
}

impl Validator<Value> for JsonTypeTagValidator {
    fn validate(&self, data: &Value) -> Result<(), ConvertError> {
        let found = data.get("type").and_then(Value::as_str);
        if found != Some(self.expected) {
            let id = data
                .get("id")
                .or_else(|| data.get("key"))
                .and_then(Value::as_str)
                .map(String::from);
            return Err(ConvertError::validate(
                "C001",
                format!(
                    "Data '{}' has type '{}', expected '{}'",
                    id.as_deref().unwrap_or("<unknown>"),
                    found.unwrap_or("<missing>"),
                    self.expected
                ),
                id,
            ));
        }
        Ok(())
    }
}
