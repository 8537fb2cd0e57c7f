use indexmap::IndexMap;

use crate::config::Settings;
use crate::convert::{BiConverter, ConvertContext, Converter, DataType, Validators};
use crate::error::ConvertError;
use crate::model::{Component, ComponentField};
use crate::tree::{WebComponent, WebComponentField};
use crate::validate::Validator;

/// Component fields become `{key: {hook, need_render, value}}`. `hook` is always false.
pub struct ComponentConverter;

impl Converter for ComponentConverter {
    type Source = Component;
    type Target = WebComponent;

    const SOURCE: DataType = DataType::DataModel;
    const TARGET: DataType = DataType::WebPipeline;
    const NAME: &'static str = "ComponentConverter";

    fn convert(source: &Component, _ctx: &ConvertContext) -> Result<WebComponent, ConvertError> {
        let data: IndexMap<String, WebComponentField> = source
            .data
            .iter()
            .map(|field| {
                (
                    field.key.clone(),
                    WebComponentField {
                        hook: false,
                        need_render: field.need_render,
                        value: field.value.clone(),
                    },
                )
            })
            .collect();
        Ok(WebComponent {
            code: source.code.clone(),
            version: source.version.clone(),
            data,
        })
    }
}

impl BiConverter for ComponentConverter {
    fn reverse_validators(_settings: &Settings) -> Validators<WebComponent> {
        vec![Box::new(UnhookedFieldsValidator)]
    }

    fn reconvert(target: &WebComponent, _ctx: &ConvertContext) -> Result<Component, ConvertError> {
        let data = target
            .data
            .iter()
            .map(|(key, field)| ComponentField {
                key: key.clone(),
                value: field.value.clone(),
                field_type: None,
                need_render: field.need_render,
            })
            .collect();
        Ok(Component {
            code: target.code.clone(),
            version: target.version.clone(),
            data,
        })
    }
}

/// Hooked fields read their value from a constant and have no data-model form.
struct UnhookedFieldsValidator;

impl Validator<WebComponent> for UnhookedFieldsValidator {
    fn validate(&self, data: &WebComponent) -> Result<(), ConvertError> {
        match data.data.iter().find(|(_, field)| field.hook) {
            Some((key, _)) => Err(ConvertError::validate(
                "C008",
                format!(
                    "Component '{}' field '{}' is hooked and cannot be converted back",
                    data.code, key
                ),
                None,
            )),
            None => Ok(()),
        }
    }
}
