//! Constant validators: whitelist membership for custom constants and
//! key/source consistency for component-input constants.

use serde_json::Value;

use super::Validator;
use crate::config::ConstantRegistry;
use crate::error::ConvertError;
use crate::model::Constant;

/// Custom constants must use a registered `custom_type` and `source_tag`.
pub struct CustomConstantValidator {
    registry: ConstantRegistry,
}

impl CustomConstantValidator {
    pub fn new(registry: ConstantRegistry) -> Self {
        CustomConstantValidator { registry }
    }
}

impl Validator<Constant> for CustomConstantValidator {
    fn validate(&self, data: &Constant) -> Result<(), ConvertError> {
        match data {
            Constant::Custom(c) => check_whitelists(
                &self.registry,
                &c.key,
                Some(c.custom_type.as_str()),
                Some(c.source_tag.as_str()),
            ),
            _ => Ok(()),
        }
    }
}

pub struct JsonCustomConstantValidator {
    registry: ConstantRegistry,
}

impl JsonCustomConstantValidator {
    pub fn new(registry: ConstantRegistry) -> Self {
        JsonCustomConstantValidator { registry }
    }
}

impl Validator<Value> for JsonCustomConstantValidator {
    fn validate(&self, data: &Value) -> Result<(), ConvertError> {
        check_whitelists(
            &self.registry,
            data.get("key").and_then(Value::as_str).unwrap_or_default(),
            data.get("custom_type").and_then(Value::as_str),
            data.get("source_tag").and_then(Value::as_str),
        )
    }
}

fn check_whitelists(
    registry: &ConstantRegistry,
    key: &str,
    custom_type: Option<&str>,
    source_tag: Option<&str>,
) -> Result<(), ConvertError> {
    if !custom_type.is_some_and(|t| registry.has_custom_type(t)) {
        return Err(ConvertError::validate(
            "C004",
            format!(
                "Constant '{}' has custom type '{}', which is not registered",
                key,
                custom_type.unwrap_or_default()
            ),
            None,
        ));
    }
    if !source_tag.is_some_and(|t| registry.has_source_tag(t)) {
        return Err(ConvertError::validate(
            "C004",
            format!(
                "Constant '{}' has source tag '{}', which is not registered",
                key,
                source_tag.unwrap_or_default()
            ),
            None,
        ));
    }
    Ok(())
}

/// Component-input constants are named after the component field they expose:
/// `source_tag` is `<component_code>.<field>`, and the constant key and every
/// `source_info` value must equal that field.
pub struct ComponentInputValidator;

impl Validator<Constant> for ComponentInputValidator {
    fn validate(&self, data: &Constant) -> Result<(), ConvertError> {
        match data {
            Constant::ComponentInputs(c) => check_component_input(
                &c.key,
                &c.source_tag,
                c.source_info.iter().map(|info| info.value.as_str()),
            ),
            _ => Ok(()),
        }
    }
}

pub struct JsonComponentInputValidator;

impl Validator<Value> for JsonComponentInputValidator {
    fn validate(&self, data: &Value) -> Result<(), ConvertError> {
        let infos = data
            .get("source_info")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|info| info.get("value").and_then(Value::as_str).unwrap_or_default())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        check_component_input(
            data.get("key").and_then(Value::as_str).unwrap_or_default(),
            data.get("source_tag").and_then(Value::as_str).unwrap_or_default(),
            infos.into_iter(),
        )
    }
}

fn check_component_input<'a>(
    key: &str,
    source_tag: &str,
    infos: impl Iterator<Item = &'a str>,
) -> Result<(), ConvertError> {
    let tag_field = match source_tag.split('.').collect::<Vec<_>>().as_slice() {
        [_, field] => *field,
        _ => {
            return Err(ConvertError::validate(
                "C005",
                format!(
                    "Constant '{}' has source tag '{}', expected '<component_code>.<field>'",
                    key, source_tag
                ),
                None,
            ));
        }
    };
    for info_field in infos {
        if !(key == info_field && info_field == tag_field) {
            return Err(ConvertError::validate(
                "C006",
                format!(
                    "Constant '{}' must match its source field: source tag field '{}', source info field '{}'",
                    key, tag_field, info_field
                ),
                None,
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn component_input(key: &str, source_tag: &str, info_value: &str) -> Value {
        json!({
            "type": "component_inputs",
            "name": "input",
            "key": key,
            "source_tag": source_tag,
            "source_info": [{"key": "node_1", "value": info_value}],
        })
    }

    #[test]
    fn custom_constant_whitelists() {
        let validator = JsonCustomConstantValidator::new(ConstantRegistry::default());
        let ok = json!({"key": "a", "custom_type": "input", "source_tag": "input.input"});
        assert!(validator.validate(&ok).is_ok());

        let bad_type = json!({"key": "a", "custom_type": "nope", "source_tag": "input.input"});
        assert_eq!(validator.validate(&bad_type).unwrap_err().code, "C004");

        let missing_tag = json!({"key": "a", "custom_type": "input"});
        assert_eq!(validator.validate(&missing_tag).unwrap_err().code, "C004");
    }

    #[test]
    fn component_input_keys_must_agree() {
        let validator = JsonComponentInputValidator;
        assert!(validator
            .validate(&component_input("field", "bk_http.field", "field"))
            .is_ok());
        assert_eq!(
            validator
                .validate(&component_input("${field}", "bk_http.field", "field"))
                .unwrap_err()
                .code,
            "C006"
        );
        assert_eq!(
            validator
                .validate(&component_input("field", "bk_http.other", "field"))
                .unwrap_err()
                .code,
            "C006"
        );
    }

    #[test]
    fn component_input_source_tag_needs_two_parts() {
        let validator = JsonComponentInputValidator;
        for tag in ["field", "a.b.c", ""] {
            let err = validator
                .validate(&component_input("field", tag, "field"))
                .unwrap_err();
            assert_eq!(err.code, "C005");
        }
    }
}
