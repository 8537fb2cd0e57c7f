//! JSON → DataModel converters.
//!
//! Required keys are read explicitly and a missing or mistyped one fails with
//! `P001`. Optional keys follow an apply-if-present policy: they overwrite the
//! target's default only when the key exists in the source object.

pub mod component;
pub mod constant;
pub mod gateway;
pub mod node;
pub mod pipeline;

pub use component::ComponentConverter;
pub use constant::{
    ComponentInputConverter, ComponentOutputConverter, CustomConstantConverter,
    SourceInfoConverter,
};
pub use gateway::{
    ConditionConverter, ConditionSet, ConditionalParallelGatewayConverter,
    ConvergeGatewayConverter, ExclusiveGatewayConverter, ParallelGatewayConverter,
};
pub use node::{ComponentNodeConverter, EndNodeConverter, StartNodeConverter};
pub use pipeline::PipelineConverter;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ConvertError;

/// The id (or constant key) of a JSON object, for error messages.
fn owner(data: &Value) -> Option<String> {
    data.get("id")
        .or_else(|| data.get("key"))
        .and_then(Value::as_str)
        .map(String::from)
}

fn decode<T: DeserializeOwned>(data: &Value, key: &str, value: &Value) -> Result<T, ConvertError> {
    T::deserialize(value).map_err(|e| {
        ConvertError::parse(
            "P001",
            format!("Field '{}' has an unexpected shape: {}", key, e),
            owner(data),
        )
    })
}

pub(crate) fn required<T: DeserializeOwned>(data: &Value, key: &str) -> Result<T, ConvertError> {
    match data.get(key) {
        Some(value) => decode(data, key, value),
        None => Err(ConvertError::parse(
            "P001",
            format!("Missing required field '{}'", key),
            owner(data),
        )),
    }
}

pub(crate) fn optional<T: DeserializeOwned>(
    data: &Value,
    key: &str,
) -> Result<Option<T>, ConvertError> {
    data.get(key).map(|value| decode(data, key, value)).transpose()
}

/// Overwrite `slot` with `data[key]` when the key is present.
pub(crate) fn apply_optional<T: DeserializeOwned>(
    data: &Value,
    key: &str,
    slot: &mut T,
) -> Result<(), ConvertError> {
    if let Some(value) = optional(data, key)? {
        *slot = value;
    }
    Ok(())
}
