use serde_json::Value;

use crate::convert::{ConvertContext, Converter, DataType};
use crate::error::ConvertError;
use crate::model::{Component, ComponentField};

use super::{apply_optional, optional, required};

/// `{code, version, data: [{key, value, type?, need_render?}]}`.
pub struct ComponentConverter;

impl Converter for ComponentConverter {
    type Source = Value;
    type Target = Component;

    const SOURCE: DataType = DataType::Json;
    const TARGET: DataType = DataType::DataModel;
    const NAME: &'static str = "ComponentConverter";

    fn convert(source: &Value, _ctx: &ConvertContext) -> Result<Component, ConvertError> {
        let fields: Vec<Value> = optional(source, "data")?.unwrap_or_default();
        let data = fields
            .iter()
            .map(|field| {
                let mut converted = ComponentField {
                    key: required(field, "key")?,
                    value: required(field, "value")?,
                    field_type: optional(field, "type")?,
                    need_render: true,
                };
                apply_optional(field, "need_render", &mut converted.need_render)?;
                Ok(converted)
            })
            .collect::<Result<Vec<_>, ConvertError>>()?;

        Ok(Component {
            code: required(source, "code")?,
            version: required(source, "version")?,
            data,
        })
    }
}
