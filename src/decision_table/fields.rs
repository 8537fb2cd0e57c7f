use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::DecisionTableError;

/// Column metadata of a decision table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub tips: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub options: Option<Value>,
}

pub type InputField = Field;
pub type OutputField = Field;

impl Field {
    pub fn from_meta(meta: &Value) -> Result<Self, DecisionTableError> {
        Field::deserialize(meta).map_err(|e| DecisionTableError::BadField(e.to_string()))
    }

    pub fn column(&self) -> Column {
        Column {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub name: String,
}
