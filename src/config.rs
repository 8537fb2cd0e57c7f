//! Converter settings.
//!
//! Settings are plain serde data so a host service can load them from its own
//! configuration source. Every field has a default, so `{}` is a valid document.

use serde::{Deserialize, Serialize};

const DEFAULT_CUSTOM_TYPES: &[&str] = &[
    "input",
    "textarea",
    "datetime",
    "int",
    "password",
    "select",
    "date",
    "time",
    "float",
    "ip_selector",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub constants: ConstantRegistry,
    pub decision_table: DecisionTableSettings,
    pub structure: StructureSettings,
}

impl Settings {
    /// Load settings from a JSON document. Missing sections keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Whitelists consulted when validating custom constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstantRegistry {
    pub custom_types: Vec<String>,
    pub source_tags: Vec<String>,
}

impl Default for ConstantRegistry {
    fn default() -> Self {
        ConstantRegistry {
            custom_types: DEFAULT_CUSTOM_TYPES.iter().map(|t| t.to_string()).collect(),
            source_tags: DEFAULT_CUSTOM_TYPES
                .iter()
                .map(|t| format!("{}.{}", t, t))
                .collect(),
        }
    }
}

impl ConstantRegistry {
    pub fn has_custom_type(&self, custom_type: &str) -> bool {
        self.custom_types.iter().any(|t| t == custom_type)
    }

    pub fn has_source_tag(&self, source_tag: &str) -> bool {
        self.source_tags.iter().any(|t| t == source_tag)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionTableSettings {
    pub hit_policy: String,
    pub validate_schema: bool,
}

impl Default for DecisionTableSettings {
    fn default() -> Self {
        DecisionTableSettings {
            hit_policy: "Unique".into(),
            validate_schema: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StructureSettings {
    /// Tolerate loops in the node graph during structural validation.
    pub allow_cycles: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let settings = Settings::from_json("{}").unwrap();
        assert!(settings.constants.has_custom_type("textarea"));
        assert!(settings.constants.has_source_tag("textarea.textarea"));
        assert_eq!(settings.decision_table.hit_policy, "Unique");
        assert!(settings.decision_table.validate_schema);
        assert!(!settings.structure.allow_cycles);
    }

    #[test]
    fn partial_document_overrides_only_given_fields() {
        let settings =
            Settings::from_json(r#"{"constants": {"custom_types": ["my_type"]}}"#).unwrap();
        assert!(settings.constants.has_custom_type("my_type"));
        assert!(!settings.constants.has_custom_type("textarea"));
        // source_tags falls back to its own default
        assert!(settings.constants.has_source_tag("input.input"));
    }
}
